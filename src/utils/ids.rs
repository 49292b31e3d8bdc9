// Random alphanumeric identifiers
// Used for store-assigned document ids and fallback image labels

use rand::{distributions::Alphanumeric, thread_rng, Rng};

/// Length of generated labels for uploads without a file name
pub const LABEL_LENGTH: usize = 16;

pub fn generate_id(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
