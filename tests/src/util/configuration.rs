use elector::configuration::*;

const FOREVER: u64 = 1000 * 60 * 60 * 24 * 365;

pub fn never_election_timeout() -> Configuration {
    Configuration {
        election: ElectionConfiguration {
            election_timeout_millis: FOREVER,
            request_vote_timeout_millis: FOREVER,
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn fast_election_timeout() -> Configuration {
    Configuration {
        election: ElectionConfiguration {
            election_timeout_millis: 50,
            election_timeout_jitter_millis: 100,
            request_vote_timeout_millis: 50,
        },
        ..Default::default()
    }
}
