//! Primary-key generators built from a type name plus a properties bag.

use crate::error::GeneratorConstructionError;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

pub trait IdGenerator: Debug + Send + Sync {
    /// Type name this generator was built from.
    fn name(&self) -> &str;
    fn next_id(&self) -> i64;
}

pub trait IdGeneratorFactory: Send + Sync {
    fn build(
        &self,
        type_name: &str,
        properties: &HashMap<String, String>,
    ) -> Result<Arc<dyn IdGenerator>, GeneratorConstructionError>;
}

/// Builds the generators shipped with the engine (currently `SnowflakeId`).
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinIdGeneratorFactory;

impl IdGeneratorFactory for BuiltinIdGeneratorFactory {
    fn build(
        &self,
        type_name: &str,
        properties: &HashMap<String, String>,
    ) -> Result<Arc<dyn IdGenerator>, GeneratorConstructionError> {
        match type_name {
            SnowflakeId::TYPE_NAME => Ok(Arc::new(SnowflakeId::from_properties(properties)?)),
            other => Err(GeneratorConstructionError::UnknownType(other.to_string())),
        }
    }
}

/// 2018-07-01T00:00:00Z in unix millis.
const DEFAULT_EPOCH_MS: i64 = 1_530_403_200_000;
const DEFAULT_WORKER_ID_BITS: u32 = 10;
const DEFAULT_SEQUENCE_BITS: u32 = 12;
/// Worker and sequence bits share this budget; the rest of the 63 bits hold the timestamp.
const MAX_NODE_BITS: u32 = 22;

#[derive(Debug)]
struct SnowflakeState {
    last_timestamp: i64,
    sequence: i64,
}

/// Time-ordered 63-bit ids: `timestamp | worker_id | sequence`.
#[derive(Debug)]
pub struct SnowflakeId {
    epoch_ms: i64,
    worker_id: i64,
    worker_id_bits: u32,
    sequence_bits: u32,
    state: Mutex<SnowflakeState>,
}

impl SnowflakeId {
    pub const TYPE_NAME: &'static str = "SnowflakeId";

    pub fn new(
        worker_id: i64,
        worker_id_bits: u32,
        sequence_bits: u32,
        epoch_ms: i64,
    ) -> Result<Self, GeneratorConstructionError> {
        for (property, bits) in [
            ("WorkerIdBits", worker_id_bits),
            ("SequenceBits", sequence_bits),
        ] {
            if bits > MAX_NODE_BITS {
                return Err(invalid(
                    property,
                    &bits.to_string(),
                    &format!("must not exceed {}", MAX_NODE_BITS),
                ));
            }
        }
        if worker_id_bits + sequence_bits > MAX_NODE_BITS {
            return Err(invalid(
                "WorkerIdBits",
                &worker_id_bits.to_string(),
                &format!(
                    "worker and sequence bits together must not exceed {}",
                    MAX_NODE_BITS
                ),
            ));
        }
        let max_worker_id = (1i64 << worker_id_bits) - 1;
        if worker_id < 0 || worker_id > max_worker_id {
            return Err(invalid(
                "WorkerId",
                &worker_id.to_string(),
                &format!("must be between 0 and {}", max_worker_id),
            ));
        }
        if epoch_ms < 0 || epoch_ms > Self::now_ms() {
            return Err(invalid(
                "Epoch",
                &epoch_ms.to_string(),
                "must lie between the unix epoch and now",
            ));
        }
        Ok(SnowflakeId {
            epoch_ms,
            worker_id,
            worker_id_bits,
            sequence_bits,
            state: Mutex::new(SnowflakeState {
                last_timestamp: -1,
                sequence: 0,
            }),
        })
    }

    /// Properties: `WorkerId`, `WorkerIdBits`, `SequenceBits`, `Epoch` (unix millis or RFC 3339).
    pub fn from_properties(
        properties: &HashMap<String, String>,
    ) -> Result<Self, GeneratorConstructionError> {
        let worker_id = parse_prop(properties, "WorkerId", 0i64)?;
        let worker_id_bits = parse_prop(properties, "WorkerIdBits", DEFAULT_WORKER_ID_BITS)?;
        let sequence_bits = parse_prop(properties, "SequenceBits", DEFAULT_SEQUENCE_BITS)?;
        let epoch_ms = match properties.get("Epoch") {
            None => DEFAULT_EPOCH_MS,
            Some(raw) => parse_epoch(raw)?,
        };
        SnowflakeId::new(worker_id, worker_id_bits, sequence_bits, epoch_ms)
    }

    fn now_ms() -> i64 {
        Utc::now().timestamp_millis()
    }
}

impl IdGenerator for SnowflakeId {
    fn name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn next_id(&self) -> i64 {
        let sequence_mask = (1i64 << self.sequence_bits) - 1;
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        // A clock that steps backwards keeps issuing from the last seen millisecond.
        let mut timestamp = Self::now_ms().max(state.last_timestamp);
        if timestamp == state.last_timestamp {
            state.sequence = (state.sequence + 1) & sequence_mask;
            if state.sequence == 0 {
                while timestamp <= state.last_timestamp {
                    std::hint::spin_loop();
                    timestamp = Self::now_ms();
                }
            }
        } else {
            state.sequence = 0;
        }
        state.last_timestamp = timestamp;

        let elapsed = (timestamp - self.epoch_ms).max(0);
        (elapsed << (self.worker_id_bits + self.sequence_bits))
            | (self.worker_id << self.sequence_bits)
            | state.sequence
    }
}

fn invalid(property: &str, value: &str, reason: &str) -> GeneratorConstructionError {
    GeneratorConstructionError::InvalidProperty {
        property: property.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_prop<T>(
    properties: &HashMap<String, String>,
    key: &str,
    default: T,
) -> Result<T, GeneratorConstructionError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match properties.get(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| invalid(key, raw, &e.to_string())),
    }
}

fn parse_epoch(raw: &str) -> Result<i64, GeneratorConstructionError> {
    let raw_trimmed = raw.trim();
    if let Ok(ms) = raw_trimmed.parse::<i64>() {
        return Ok(ms);
    }
    DateTime::parse_from_rfc3339(raw_trimmed)
        .map(|dt| dt.with_timezone(&Utc).timestamp_millis())
        .map_err(|e| invalid("Epoch", raw, &e.to_string()))
}
