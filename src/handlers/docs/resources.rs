// OpenAPI paths for the generic resource routers
// One block per resource kind, built from its static description

use serde_json::{json, Map, Value};

use crate::handlers::resource::ResourceKind;

fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{}", name) })
}

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {"application/json": {"schema": schema_ref("ErrorResponse")}}
    })
}

fn id_param(label: &str) -> Value {
    json!({
        "name": "id",
        "in": "path",
        "required": true,
        "description": format!("{} id", label),
        "schema": {"type": "string"}
    })
}

fn json_body(schema: Value) -> Value {
    json!({
        "required": true,
        "content": {"application/json": {"schema": schema}}
    })
}

fn mutation_ok(description: &str) -> Value {
    json!({
        "description": description,
        "content": {"application/json": {"schema": schema_ref("MutationResponse")}}
    })
}

fn write_schema(kind: &ResourceKind) -> Value {
    json!({
        "type": "object",
        "required": kind.required_fields,
        "additionalProperties": true
    })
}

fn operation_id(verb: &str, kind: &ResourceKind) -> String {
    format!("{}{}", verb, kind.schema)
}

/// Paths for one resource kind, keyed by URL
pub fn resource_paths(kind: &ResourceKind) -> Map<String, Value> {
    let tag = kind.schema;
    let security = json!([{"bearerAuth": []}]);
    let mut paths = Map::new();

    paths.insert(
        kind.prefix.to_string(),
        json!({
            "get": {
                "tags": [tag],
                "summary": format!("List {}", kind.collection),
                "operationId": operation_id("list", kind),
                "responses": {
                    "200": {
                        "description": "All documents",
                        "content": {"application/json": {"schema": {
                            "type": "array",
                            "items": schema_ref(kind.schema)
                        }}}
                    },
                    kind.empty_list_status.as_str(): {
                        "description": "Empty collection",
                        "content": {"application/json": {"schema": schema_ref("MessageResponse")}}
                    }
                }
            },
            "post": {
                "tags": [tag],
                "summary": format!("Create a {}", kind.label.to_lowercase()),
                "operationId": operation_id("create", kind),
                "requestBody": json_body(write_schema(kind)),
                "responses": {
                    "200": mutation_ok("Document created"),
                    "400": error_response("Body is not a JSON object"),
                    "403": error_response("Missing field, missing/invalid token or non-admin caller")
                },
                "security": security
            }
        }),
    );

    paths.insert(
        format!("{}/{{id}}", kind.prefix),
        json!({
            "get": {
                "tags": [tag],
                "summary": if kind.counts_views {
                    format!("Get a {} (increments nb_vues)", kind.label.to_lowercase())
                } else {
                    format!("Get a {}", kind.label.to_lowercase())
                },
                "operationId": operation_id("get", kind),
                "parameters": [id_param(kind.label)],
                "responses": {
                    "200": {
                        "description": "Document",
                        "content": {"application/json": {"schema": schema_ref(kind.schema)}}
                    },
                    "404": error_response("Unknown document")
                }
            },
            "put": {
                "tags": [tag],
                "summary": format!("Update a {}", kind.label.to_lowercase()),
                "operationId": operation_id("update", kind),
                "parameters": [id_param(kind.label)],
                "requestBody": json_body(write_schema(kind)),
                "responses": {
                    "200": mutation_ok("Document updated"),
                    "400": error_response("Body is not a JSON object"),
                    "403": error_response("Missing field, missing/invalid token or non-admin caller"),
                    "404": error_response("Unknown document")
                },
                "security": security
            },
            "delete": {
                "tags": [tag],
                "summary": format!("Delete a {}", kind.label.to_lowercase()),
                "operationId": operation_id("delete", kind),
                "parameters": [id_param(kind.label)],
                "responses": {
                    "203": {
                        "description": "Document deleted",
                        "content": {"application/json": {"schema": schema_ref("MessageResponse")}}
                    },
                    "403": error_response("Missing/invalid token or non-admin caller"),
                    "404": error_response("Unknown document")
                },
                "security": security
            }
        }),
    );

    let id_list = json!({"type": "array", "items": {"type": "string"}});
    for (suffix, verb, summary) in [
        ("", "addImagesTo", "Attach image ids (duplicates skipped)"),
        ("/remove", "removeImagesFrom", "Detach image ids (absent ids ignored)"),
    ] {
        paths.insert(
            format!("{}/images/{{id}}{}", kind.prefix, suffix),
            json!({
                "put": {
                    "tags": [tag],
                    "summary": summary,
                    "operationId": operation_id(verb, kind),
                    "parameters": [id_param(kind.label)],
                    "requestBody": json_body(id_list.clone()),
                    "responses": {
                        "200": mutation_ok("Image list updated"),
                        "400": error_response("Body is not an array of strings"),
                        "403": error_response("Missing/invalid token or non-admin caller"),
                        "404": error_response("Unknown document")
                    },
                    "security": security
                }
            }),
        );
    }

    paths
}
