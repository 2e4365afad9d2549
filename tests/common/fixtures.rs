use super::historical;
use sensview::test_utils::MemorySource;

/// Pressure in psi and temperature in F, sampled on shared timestamps.
pub fn pressure_and_temperature() -> MemorySource {
    MemorySource::new()
        .with_metric(
            "pressure",
            historical("pressure", "psi", &[(100, 10.0)]),
        )
        .with_metric(
            "temperature",
            historical("temperature", "F", &[(150, 70.0)]),
        )
}

/// Two metrics sharing the psi unit.
pub fn inlet_and_outlet() -> MemorySource {
    MemorySource::new()
        .with_metric("inlet", historical("inlet", "psi", &[(100, 30.0), (200, 31.0)]))
        .with_metric("outlet", historical("outlet", "psi", &[(100, 20.0), (200, 21.0)]))
}

/// Sample JSON lines for the replay source
pub fn replay_jsonl(first: i64, second: i64) -> String {
    format!(
        "{{\"metric\":\"pressure\",\"at\":{first},\"value\":10,\"unit\":\"psi\"}}\n\
         {{\"metric\":\"pressure\",\"at\":{second},\"value\":12,\"unit\":\"psi\"}}\n"
    )
}
