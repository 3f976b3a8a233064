// ── Service throughput rates ──
//
// The API only reports cumulative counters. Rates are derived by diffing
// each service against the same service in the previous snapshot.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use gostly_api::{Config, ServiceConfig};

/// Mark every service's counters in `config` as captured at `at`.
pub fn stamp(config: &mut Config, at: DateTime<Utc>) {
    for stats in config
        .services
        .iter_mut()
        .filter_map(|s| s.status.as_mut()?.stats.as_mut())
    {
        stats.time = Some(at);
    }
}

/// Fill `request_rate`, `input_rate_bytes` and `output_rate_bytes` on every
/// service in `next` from its counterpart in `prev`.
///
/// A counterpart must share both `name` and `createTime`; a recreated
/// service starts from zero rates. Counters that went backwards (server
/// restart) produce a rate of zero.
pub fn apply_rates(prev: &Config, next: &mut Config) {
    let previous: HashMap<&str, &ServiceConfig> =
        prev.services.iter().map(|s| (s.name.as_str(), s)).collect();

    for svc in &mut next.services {
        let Some(old) = previous.get(svc.name.as_str()) else {
            continue;
        };
        if old.create_time() != svc.create_time() {
            continue;
        }
        let Some(old_stats) = old.stats() else {
            continue;
        };
        let Some(new_stats) = svc.status.as_mut().and_then(|s| s.stats.as_mut()) else {
            continue;
        };
        let (Some(t0), Some(t1)) = (old_stats.time, new_stats.time) else {
            continue;
        };
        let Ok(elapsed) = (t1 - t0).to_std() else {
            continue;
        };
        let secs = elapsed.as_secs_f64();
        if secs <= 0.0 {
            continue;
        }

        new_stats.input_rate_bytes = rate(new_stats.input_bytes, old_stats.input_bytes, secs);
        new_stats.output_rate_bytes = rate(new_stats.output_bytes, old_stats.output_bytes, secs);
        new_stats.request_rate = rate(new_stats.total_conns, old_stats.total_conns, secs);
    }
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn rate(new: u64, old: u64, secs: f64) -> f64 {
    new.saturating_sub(old) as f64 / secs
}
