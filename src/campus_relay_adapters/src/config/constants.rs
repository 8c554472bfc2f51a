pub mod env {
    pub const ENV_PREFIX: &str = "CAMPUS_RELAY";
    pub const ENV_SEPARATOR: &str = "__";
}

pub const CONFIG_FILE: &str = "config/relay.json";
pub const DEFAULT_LOG_FILTER: &str = "info";

pub mod defaults {
    pub mod sso {
        pub const BASE_URL: &str = "https://uis.fudan.edu.cn/authserver";
        pub const LANDING_PATH: &str = "index.do";
    }

    pub mod http {
        pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15";
        pub const TIMEOUT_IN_MILLIS: u64 = 10_000;
        pub const MAX_REDIRECTS: usize = 10;
    }

    pub mod session {
        pub const TTL_IN_SECONDS: u32 = 7_200;
    }
}
