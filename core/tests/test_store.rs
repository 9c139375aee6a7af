// Backends: the debugfs directory (emulated with plain files) and the
// in-memory store used by the other suites.

#[cfg(test)]
mod tests {
    use std::fs::{self, File};
    use std::io::ErrorKind;

    use framestore_core::codec::FramestoreCodec;
    use framestore_core::constants::MJPG_FRAME_SIZE_MAX;
    use framestore_core::layout::{MetaFile, ARENA_FILE};
    use framestore_core::store::{DebugfsStore, MemoryStore, RawIo};
    use tempfile::tempdir;

    const M: u64 = MJPG_FRAME_SIZE_MAX as u64;

    fn debugfs_dir(capacity: u64) -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        File::create(dir.path().join(ARENA_FILE)).unwrap().set_len(capacity).unwrap();
        dir
    }

    #[test]
    fn open_requires_existing_dir() {
        let dir = tempdir().unwrap();
        let err = DebugfsStore::open(dir.path().join("missing")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn debugfs_meta_files_use_driver_names() {
        let dir = debugfs_dir(M);
        let mut store = DebugfsStore::open(dir.path()).unwrap().with_capacity(M);
        store.write_meta(MetaFile::SegmentFormats, b"MY").unwrap();
        assert_eq!(fs::read(dir.path().join("segm_fmats")).unwrap(), b"MY");
        assert_eq!(store.read_meta(MetaFile::SegmentFormats).unwrap(), b"MY".to_vec());
    }

    #[test]
    fn debugfs_arena_positioned_io() {
        let dir = debugfs_dir(M);
        let mut store = DebugfsStore::open(dir.path()).unwrap().with_capacity(M);
        store.write_arena(100, &[1, 2, 3]).unwrap();
        assert_eq!(&store.read_arena(99, 5).unwrap()[..], &[0, 1, 2, 3, 0]);
        // arena keeps its size
        assert_eq!(fs::metadata(dir.path().join(ARENA_FILE)).unwrap().len(), M);
    }

    #[test]
    fn debugfs_rejects_access_past_capacity() {
        let dir = debugfs_dir(16);
        let mut store = DebugfsStore::open(dir.path()).unwrap().with_capacity(16);
        assert_eq!(store.write_arena(14, &[0; 4]).unwrap_err().kind(), ErrorKind::InvalidInput);
        assert_eq!(store.read_arena(16, 1).unwrap_err().kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn debugfs_round_trip() {
        let src = tempdir().unwrap();
        let seg = src.path().join("00");
        fs::create_dir_all(&seg).unwrap();
        fs::write(seg.join("frame_0000.mjpg"), [0xFF, 0xD8, 1, 2]).unwrap();
        fs::write(seg.join("frame_0001.mjpg"), [0xFF, 0xD8, 3]).unwrap();

        let dev = debugfs_dir(2 * M);
        let store = DebugfsStore::open(dev.path()).unwrap().with_capacity(2 * M);
        let mut codec = FramestoreCodec::with_tracing(store);
        codec.export_to_device(src.path()).unwrap();
        assert_eq!(fs::read(dev.path().join("n_segms")).unwrap(), b"1");

        let out = tempdir().unwrap();
        codec.import_from_device(out.path()).unwrap();
        assert_eq!(fs::read(out.path().join("00/frame_0001.mjpg")).unwrap(), vec![0xFF, 0xD8, 3]);
    }

    #[test]
    fn memory_unwritten_bytes_read_as_zero() {
        let mut store = MemoryStore::new(64);
        store.write_arena(8, &[9]).unwrap();
        assert_eq!(&store.read_arena(6, 4).unwrap()[..], &[0, 0, 9, 0]);
        assert_eq!(store.arena().len(), 9);
        assert!(store.read_arena(60, 8).is_err());
    }

    #[test]
    fn memory_fixed_blobs_overlay_prefix() {
        let mut store = MemoryStore::new(64).with_fixed_blobs();
        let size = MemoryStore::blob_size(MetaFile::DataOffsets).unwrap();
        assert_eq!(store.read_meta(MetaFile::DataOffsets).unwrap(), vec![0u8; size]);
        assert_eq!(store.read_meta(MetaFile::SegmentCount).unwrap(), b"0\n".to_vec());

        store.write_meta(MetaFile::DataOffsets, &[1; 8]).unwrap();
        store.write_meta(MetaFile::DataOffsets, &[2; 4]).unwrap();
        let blob = store.read_meta(MetaFile::DataOffsets).unwrap();
        assert_eq!(blob.len(), size);
        assert_eq!(&blob[..8], &[2, 2, 2, 2, 1, 1, 1, 1]);

        let err = store.write_meta(MetaFile::DataOffsets, &vec![0; size + 1]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
