//! Property tests: arbitrary payload sequences read back byte-for-byte

use commitlog::{Config, Log, Record};
use proptest::collection::vec;
use proptest::prelude::*;

use crate::setup_temp_dir;

fn small_config() -> Config {
    Config::builder().max_store_bytes(128).max_index_bytes(48).build()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn appended_records_read_back(
        payloads in vec(vec(any::<u8>(), 0..64), 1..40),
        offsets in vec(any::<u64>(), 40),
    ) {
        let (_temp, path) = setup_temp_dir();
        let records: Vec<Record> = payloads
            .iter()
            .zip(&offsets)
            .map(|(value, offset)| Record::with_offset(value.clone(), *offset))
            .collect();

        {
            let log = Log::open(&path, small_config()).unwrap();
            for (i, record) in records.iter().enumerate() {
                prop_assert_eq!(log.append(record).unwrap(), i as u64);
            }
            prop_assert_eq!(log.offset_range(), (0, records.len() as u64));
            log.close().unwrap();
        }

        let log = Log::open(&path, small_config()).unwrap();
        let (lowest, highest) = log.offset_range();
        prop_assert_eq!((lowest, highest), (0, records.len() as u64));
        for offset in lowest..highest {
            prop_assert_eq!(&log.read(offset).unwrap(), &records[offset as usize]);
        }
    }
}
