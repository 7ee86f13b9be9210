use serde_json::Value;

use super::{result_payload, scalar_to_string};

/// Key output fields in priority order, across all subcommands.
const PRIORITY_KEYS: [&str; 7] = [
    "level_payment",
    "collection_rate",
    "total_pending",
    "overdue_amount",
    "status",
    "paid_amount",
    "ledger_file",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let payload = result_payload(value);

    if let Value::Object(map) = payload {
        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key) {
                if !val.is_null() {
                    println!("{}", scalar_to_string(val));
                    return;
                }
            }
        }

        // Fall back to the first scalar field
        if let Some((key, val)) = map.iter().find(|(_, v)| !v.is_object() && !v.is_array()) {
            println!("{}: {}", key, scalar_to_string(val));
            return;
        }
    }

    println!("{}", scalar_to_string(payload));
}
