use r_exhash::{ExtendibleHashTable, TableConfig, TableError};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let pages: ExtendibleHashTable<String, Vec<u8>> =
        ExtendibleHashTable::with_config(TableConfig::new(8))?;
    for i in 10000..20000 {
        let key = format!("page {}", i);
        let value = key.clone().into_bytes();
        pages.insert(key, value)?;
    }
    let mut removed = 0;
    for i in (10000..20000).step_by(3) {
        if pages.remove(&format!("page {}", i)) {
            removed += 1;
        }
    }
    log::info!(
        "string keys: {} stored, {} removed, global depth {}, {} buckets",
        pages.len(),
        removed,
        pages.global_depth(),
        pages.num_buckets()
    );

    // Integer keys route by their own low bits, so sequential ids fill the
    // directory evenly.
    let frames: ExtendibleHashTable<u32, usize> = ExtendibleHashTable::new(4)?;
    for page_id in 0..1024u32 {
        frames.insert(page_id, page_id as usize % 64)?;
    }
    log::info!(
        "page ids: {} stored, global depth {}, {} buckets, local depth of slot 0 is {}",
        frames.len(),
        frames.global_depth(),
        frames.num_buckets(),
        frames.local_depth(0)?
    );

    // A tight depth limit makes colliding ids fail instead of growing.
    let bounded: ExtendibleHashTable<u64, ()> =
        ExtendibleHashTable::with_config(TableConfig::new(1).max_global_depth(4))?;
    bounded.insert(0, ())?;
    match bounded.insert(1 << 10, ()) {
        Err(err @ TableError::CapacityExhausted { .. }) => log::warn!("{}", err),
        other => other?,
    }
    Ok(())
}
