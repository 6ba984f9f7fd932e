use crate::domain::Arena;
use crate::domain::tuning::PuckTuning;
use std::{env, net::IpAddr, str::FromStr, time::Duration};
use tracing::warn;

// Runtime/server constants (not gameplay tuning).

pub const EVENT_CHANNEL_CAPACITY: usize = 1024;
pub const WS_PATH: &str = "/dvd/ws/game";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 1234;
const DEFAULT_TICK_RATE: u32 = 20;
const MAX_TICK_RATE: u32 = 240;

// Reads `key` and parses it, falling back to `default` when unset. Present but unparsable
// or rejected values are logged and ignored.
fn env_or<T>(key: &str, default: T, valid: impl Fn(&T) -> bool) -> T
where
    T: FromStr + Copy + std::fmt::Debug,
{
    let Ok(raw) = env::var(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) if valid(&value) => value,
        _ => {
            warn!(key, value = %raw, ?default, "invalid config value; using default");
            default
        }
    }
}

fn positive(value: &f64) -> bool {
    value.is_finite() && *value > 0.0
}

pub fn host() -> IpAddr {
    let fallback = IpAddr::from([0, 0, 0, 0]);
    match env::var("GAME_SERVER_HOST") {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(value = %raw, default = DEFAULT_HOST, "invalid GAME_SERVER_HOST; using default");
            fallback
        }),
        Err(_) => fallback,
    }
}

pub fn http_port() -> u16 {
    env_or("GAME_SERVER_PORT", DEFAULT_PORT, |_| true)
}

pub fn tick_rate() -> u32 {
    env_or("TICK_RATE", DEFAULT_TICK_RATE, |hz| (1..=MAX_TICK_RATE).contains(hz))
}

pub fn tick_interval() -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(tick_rate()))
}

pub fn arena() -> Arena {
    let defaults = Arena::default();
    Arena {
        width: env_or("BOARD_WIDTH", defaults.width, positive),
        height: env_or("BOARD_HEIGHT", defaults.height, positive),
        corner_tolerance: env_or("CORNER_TOLERANCE", defaults.corner_tolerance, |v: &f64| {
            v.is_finite() && *v >= 0.0
        }),
    }
}

pub fn puck_tuning() -> PuckTuning {
    let defaults = PuckTuning::default();
    PuckTuning {
        base_width: env_or("PLAYER_WIDTH", defaults.base_width, positive),
        base_height: env_or("PLAYER_HEIGHT", defaults.base_height, positive),
        base_speed: env_or("PLAYER_SPEED", defaults.base_speed, |v: &f64| {
            positive(v) && *v <= defaults.max_speed
        }),
        ..defaults
    }
}
