//! UUIDv7 identity generation.
//!
//! Record and sub-resource ids are UUIDv7: 128-bit, collision-free in
//! practice, and safe to generate concurrently without coordination.
//! The embedded millisecond timestamp gives natural time-ordering.

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

/// Generate a new identifier.
#[inline]
pub fn new_id() -> Uuid {
    Uuid::now_v7()
}

/// Check if a UUID is version 7.
#[inline]
pub fn is_v7(uuid: &Uuid) -> bool {
    uuid.get_version_num() == 7
}

/// Extract the embedded timestamp from a UUIDv7.
///
/// Returns `None` if the UUID is not version 7.
pub fn extract_timestamp(uuid: &Uuid) -> Option<DateTime<Utc>> {
    let bytes = uuid.as_bytes();
    if (bytes[6] >> 4) != 7 {
        return None;
    }

    let millis = ((bytes[0] as u64) << 40)
        | ((bytes[1] as u64) << 32)
        | ((bytes[2] as u64) << 24)
        | ((bytes[3] as u64) << 16)
        | ((bytes[4] as u64) << 8)
        | (bytes[5] as u64);

    Utc.timestamp_millis_opt(millis as i64).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_id_is_version_7() {
        let id = new_id();
        assert!(is_v7(&id));
    }

    #[test]
    fn test_ids_are_distinct() {
        let a = new_id();
        let b = new_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_ids_are_time_ordered() {
        let a = new_id();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = new_id();
        assert!(b > a);
    }

    #[test]
    fn test_timestamp_extraction() {
        let before = Utc::now();
        let id = new_id();
        let after = Utc::now();

        let extracted = extract_timestamp(&id).expect("should extract timestamp");
        assert!(extracted >= before - Duration::milliseconds(1));
        assert!(extracted <= after + Duration::milliseconds(1));
    }

    #[test]
    fn test_v4_has_no_timestamp() {
        let id = Uuid::new_v4();
        assert!(!is_v7(&id));
        assert!(extract_timestamp(&id).is_none());
    }
}
