//! Pre-built kstat scenarios for testing.

use std::collections::HashMap;

use super::kstat::MockKstatReader;
use crate::collector::kstat::{Kstat, KstatValue};

fn cpu_info(instance: i32, model: u64, brand: &str) -> Kstat {
    let mut data = HashMap::new();
    data.insert("model".to_string(), KstatValue::UInt(model));
    data.insert("family".to_string(), KstatValue::UInt(6));
    data.insert("clock_MHz".to_string(), KstatValue::UInt(2400));
    data.insert("brand".to_string(), KstatValue::Str(brand.to_string()));

    Kstat {
        class: "misc".to_string(),
        module: "cpu_info".to_string(),
        instance,
        name: format!("cpu_info{}", instance),
        data,
    }
}

#[allow(dead_code)]
impl MockKstatReader {
    /// A four-CPU host with per-zone link kstats for zones 0 and 5.
    pub fn typical_host() -> Self {
        let mut reader = Self::new();

        for cpu in 0..4 {
            reader.add_kstat(cpu_info(cpu, 85, "Intel(r) Xeon(r) CPU E5-2690 v4"));
        }

        for (zone_id, obytes) in [(0, 987_654_321u64), (5, 12_345)] {
            let mut data = HashMap::new();
            data.insert("obytes64".to_string(), KstatValue::UInt(obytes));
            data.insert("rbytes64".to_string(), KstatValue::UInt(obytes * 2));
            reader.add_kstat(Kstat {
                class: "net".to_string(),
                module: "link".to_string(),
                instance: zone_id,
                name: "vnic0".to_string(),
                data,
            });
        }

        reader
    }
}
