use std::sync::Arc;

use rand::Rng;
use time::OffsetDateTime;

use crate::time::TimeSource;

const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const SUFFIX_LEN: usize = 8;

pub fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect()
}

/// Issues ids of the form `job_<unix seconds>_<8 lowercase alphanumerics>`.
#[derive(Clone)]
pub struct JobIdGenerator {
    timesource: Arc<dyn TimeSource + Send + Sync>,
}

impl JobIdGenerator {
    pub fn new(timesource: Arc<dyn TimeSource + Send + Sync>) -> Self {
        JobIdGenerator { timesource }
    }

    pub fn now(&self) -> OffsetDateTime {
        self.timesource.now()
    }

    pub fn next_id(&self) -> String {
        format!(
            "job_{}_{}",
            self.now().unix_timestamp(),
            random_suffix()
        )
    }
}
