// Health check endpoint OpenAPI documentation

use serde_json::json;

pub fn health_endpoint() -> serde_json::Value {
    json!({
        "get": {
            "tags": ["Health"],
            "summary": "Health check endpoint",
            "description": "Reports whether the document store answers",
            "operationId": "healthCheck",
            "responses": {
                "200": {
                    "description": "Service is healthy",
                    "content": {
                        "application/json": {
                            "schema": {"$ref": "#/components/schemas/HealthResponse"}
                        }
                    }
                },
                "503": {
                    "description": "Document store unreachable",
                    "content": {
                        "application/json": {
                            "schema": {"$ref": "#/components/schemas/HealthResponse"}
                        }
                    }
                }
            }
        }
    })
}

pub fn root_endpoint() -> serde_json::Value {
    json!({
        "get": {
            "tags": ["Health"],
            "summary": "Greeting",
            "operationId": "root",
            "responses": {
                "200": {
                    "description": "Hello World !",
                    "content": {"text/plain": {"schema": {"type": "string"}}}
                }
            }
        }
    })
}
