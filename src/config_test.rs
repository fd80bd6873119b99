use super::*;
use std::sync::{Mutex, MutexGuard, PoisonError};

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// # Safety
/// Callers hold `env_lock()` so no other test touches the environment.
unsafe fn clear_stones_env() {
    unsafe {
        std::env::remove_var("STONES_API_URL");
        std::env::remove_var("STONES_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("STONES_CONNECT_TIMEOUT_SECS");
        std::env::remove_var("STONES_POLL_INTERVAL_MS");
        std::env::remove_var("STONES_POLL_MAX_ATTEMPTS");
        std::env::remove_var("STONES_POLL_RETRY_LIMIT");
        std::env::remove_var("STONES_POLL_BACKOFF_BASE_MS");
        std::env::remove_var("STONES_POLL_BACKOFF_MAX_MS");
        std::env::remove_var("STONES_TOKEN_FILE");
    }
}

#[test]
fn from_env_defaults() {
    let _env = env_lock();
    unsafe { clear_stones_env() };

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.base_url, DEFAULT_API_URL);
    assert_eq!(
        cfg.timeouts,
        Timeouts { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    );
    assert_eq!(cfg.poll, PollPolicy::default());
    assert_eq!(cfg.poll.interval, Duration::from_secs(3));
}

#[test]
fn from_env_parses_overrides() {
    let _env = env_lock();
    unsafe {
        clear_stones_env();
        std::env::set_var("STONES_API_URL", "https://api.example.test/");
        std::env::set_var("STONES_REQUEST_TIMEOUT_SECS", "5");
        std::env::set_var("STONES_POLL_INTERVAL_MS", "250");
        std::env::set_var("STONES_POLL_RETRY_LIMIT", "2");
        std::env::set_var("STONES_TOKEN_FILE", "/tmp/stones-token");
    }

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.base_url, "https://api.example.test");
    assert_eq!(cfg.timeouts.request_secs, 5);
    assert_eq!(cfg.poll.interval, Duration::from_millis(250));
    assert_eq!(cfg.poll.retry_limit, 2);
    assert_eq!(cfg.token_file, Some(PathBuf::from("/tmp/stones-token")));

    unsafe { clear_stones_env() };
}

#[test]
fn from_env_ignores_unparsable_numbers() {
    let _env = env_lock();
    unsafe {
        clear_stones_env();
        std::env::set_var("STONES_POLL_MAX_ATTEMPTS", "lots");
    }

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.poll.max_attempts, DEFAULT_POLL_MAX_ATTEMPTS);

    unsafe { clear_stones_env() };
}

#[test]
fn from_env_rejects_non_http_url() {
    let _env = env_lock();
    unsafe {
        clear_stones_env();
        std::env::set_var("STONES_API_URL", "ftp://files.example.test");
    }

    let err = ClientConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("invalid base URL"));

    unsafe { clear_stones_env() };
}

#[test]
fn backoff_doubles_and_caps() {
    let policy = PollPolicy {
        backoff_base: Duration::from_millis(500),
        backoff_max: Duration::from_secs(3),
        ..PollPolicy::default()
    };
    assert_eq!(policy.backoff(1), Duration::from_millis(500));
    assert_eq!(policy.backoff(2), Duration::from_millis(1000));
    assert_eq!(policy.backoff(3), Duration::from_millis(2000));
    assert_eq!(policy.backoff(4), Duration::from_secs(3));
    assert_eq!(policy.backoff(40), Duration::from_secs(3));
}

#[test]
fn normalize_base_url_trims_slashes() {
    assert_eq!(normalize_base_url("http://localhost:8000//").unwrap(), "http://localhost:8000");
}
