// Kernel -> user: regrouping, size reconciliation and the fatal integrity
// checks of the read path.

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::rc::Rc;

    use framestore_core::codec::{CodecConfig, FramestoreCodec};
    use framestore_core::constants::{FDATA_MAX, MJPG_FRAME_SIZE_MAX, YUYV_FRAME_SIZE};
    use framestore_core::diagnostics::{CollectingDiagnostics, Warning};
    use framestore_core::layout::{encode_table, LayoutError, MetaFile, PixelFormat, SegmentTable};
    use framestore_core::store::{write_blobs, MemoryStore, RawIo};
    use framestore_core::types::FramestoreError;
    use tempfile::tempdir;

    const S: usize = YUYV_FRAME_SIZE as usize;

    struct Frame {
        declared: u32,
        payload: Vec<u8>,
    }

    fn frame(payload: Vec<u8>) -> Frame {
        Frame { declared: payload.len() as u32, payload }
    }

    fn jpeg(tag: u8, len: usize) -> Vec<u8> {
        let mut v = vec![tag; len.max(2)];
        v[..2].copy_from_slice(&[0xFF, 0xD8]);
        v
    }

    /// Store holding exactly the given segments, laid out as export would.
    fn seed(segments: Vec<(PixelFormat, Vec<Frame>)>) -> (MemoryStore, SegmentTable) {
        let mut store = MemoryStore::new(FDATA_MAX);
        let mut table = SegmentTable::new();
        for (format, frames) in segments {
            let view = table.push_segment(format, frames.len()).unwrap();
            for (j, f) in frames.into_iter().enumerate() {
                table.push_frame_size(f.declared);
                store.write_arena(view.frame_offset(j), &f.payload).unwrap();
            }
        }
        write_blobs(&mut store, &encode_table(&table)).unwrap();
        (store, table)
    }

    fn files(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

// ## 1️⃣ Regrouping

    #[test]
    fn raw_then_compressed_tree() {
        let raw: Vec<Vec<u8>> = (0..3u8).map(|i| vec![i; S]).collect();
        let (mut store, _) = seed(vec![
            (PixelFormat::RawPlanar, raw.iter().cloned().map(frame).collect()),
            (PixelFormat::Compressed, vec![frame(jpeg(7, 100)), frame(jpeg(8, 50))]),
        ]);

        let dir = tempdir().unwrap();
        let target = dir.path().join("out");
        let report = FramestoreCodec::with_tracing(&mut store).import_from_device(&target).unwrap();

        assert_eq!(files(&target), vec!["00", "01"]);
        assert_eq!(files(&target.join("00")), vec!["frame_0000.yuyv", "frame_0001.yuyv", "frame_0002.yuyv"]);
        assert_eq!(files(&target.join("01")), vec!["frame_0000.mjpg", "frame_0001.mjpg"]);
        assert_eq!(fs::read(target.join("00/frame_0002.yuyv")).unwrap(), raw[2]);
        assert_eq!(fs::read(target.join("01/frame_0001.mjpg")).unwrap(), jpeg(8, 50));

        assert_eq!(report.segments, 2);
        assert_eq!(report.frames_written, 5);
        assert_eq!(report.frames_skipped, 0);
        assert!(report.warnings.is_empty());
        assert!(report.sanity_check());
    }

    #[test]
    fn compressed_read_length_is_declared_size() {
        // slot holds more bytes than declared; only the declared prefix is read
        let (mut store, _) = seed(vec![(
            PixelFormat::Compressed,
            vec![Frame { declared: 4, payload: jpeg(9, 64) }],
        )]);
        let dir = tempdir().unwrap();
        FramestoreCodec::with_tracing(&mut store).import_from_device(dir.path()).unwrap();
        assert_eq!(fs::read(dir.path().join("00/frame_0000.mjpg")).unwrap(), vec![0xFF, 0xD8, 9, 9]);
    }

    #[test]
    fn empty_segment_becomes_empty_dir() {
        let (mut store, _) = seed(vec![
            (PixelFormat::Compressed, vec![]),
            (PixelFormat::Compressed, vec![frame(jpeg(1, 10))]),
        ]);
        let dir = tempdir().unwrap();
        FramestoreCodec::with_tracing(&mut store).import_from_device(dir.path()).unwrap();
        assert!(files(&dir.path().join("00")).is_empty());
        assert_eq!(files(&dir.path().join("01")), vec!["frame_0000.mjpg"]);
    }

    #[test]
    fn target_is_replaced_not_merged() {
        let (mut store, _) = seed(vec![(PixelFormat::Compressed, vec![frame(jpeg(1, 10))])]);
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("05")).unwrap();
        fs::write(dir.path().join("stale.txt"), b"old").unwrap();

        FramestoreCodec::with_tracing(&mut store).import_from_device(dir.path()).unwrap();
        assert_eq!(files(dir.path()), vec!["00"]);
    }

// ## 2️⃣ Size reconciliation

    #[test]
    fn oversized_raw_frame_is_clamped_with_one_warning() {
        let (mut store, _) = seed(vec![(
            PixelFormat::RawPlanar,
            vec![
                Frame { declared: YUYV_FRAME_SIZE + 100, payload: vec![3u8; S] },
                frame(vec![4u8; S]),
            ],
        )]);
        let diag = CollectingDiagnostics::new();
        let dir = tempdir().unwrap();
        let report = FramestoreCodec::new(&mut store, &diag).import_from_device(dir.path()).unwrap();

        let out = fs::read(dir.path().join("00/frame_0000.yuyv")).unwrap();
        assert_eq!(out.len(), S);
        assert_eq!(out, vec![3u8; S]);
        assert_eq!(
            diag.warnings(),
            vec![Warning::OversizedRawFrame {
                segment: 0,
                frame: 0,
                declared: YUYV_FRAME_SIZE + 100,
                capacity: YUYV_FRAME_SIZE,
            }]
        );
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.frames_written, 2);
    }

    #[test]
    fn undersized_raw_frame_still_reads_full_slot() {
        let (mut store, _) = seed(vec![(PixelFormat::RawPlanar, vec![Frame { declared: 10, payload: vec![1u8; S] }])]);
        let diag = CollectingDiagnostics::new();
        let dir = tempdir().unwrap();
        FramestoreCodec::new(&mut store, &diag).import_from_device(dir.path()).unwrap();
        assert_eq!(fs::read(dir.path().join("00/frame_0000.yuyv")).unwrap().len(), S);
        assert!(diag.is_empty());
    }

    #[test]
    fn strict_mode_rejects_oversized_raw_frame() {
        let (mut store, _) = seed(vec![(
            PixelFormat::RawPlanar,
            vec![Frame { declared: YUYV_FRAME_SIZE + 1, payload: vec![0u8; S] }],
        )]);
        let dir = tempdir().unwrap();
        let mut codec = FramestoreCodec::with_config(&mut store, CollectingDiagnostics::new(), CodecConfig::strict());
        assert!(matches!(
            codec.import_from_device(dir.path()),
            Err(FramestoreError::FrameTooLarge { segment: 0, frame: 0, .. })
        ));
    }

    #[test]
    fn zero_length_compressed_frame_is_a_hole() {
        let (mut store, _) = seed(vec![(
            PixelFormat::Compressed,
            vec![frame(jpeg(1, 10)), Frame { declared: 0, payload: vec![] }, frame(jpeg(3, 10))],
        )]);
        let diag = CollectingDiagnostics::new();
        let dir = tempdir().unwrap();
        let report = FramestoreCodec::new(&mut store, &diag).import_from_device(dir.path()).unwrap();

        assert_eq!(files(&dir.path().join("00")), vec!["frame_0000.mjpg", "frame_0002.mjpg"]);
        let warnings = diag.warnings();
        assert_eq!(warnings, vec![Warning::EmptyCompressedFrame { segment: 0, frame: 1 }]);
        assert!(warnings[0].is_hole());
        assert_eq!((report.frames_written, report.frames_skipped), (2, 1));
    }

// ## 3️⃣ Fatal integrity checks

    #[test]
    fn declared_size_above_compressed_slot_is_fatal() {
        let (mut store, _) = seed(vec![(
            PixelFormat::Compressed,
            vec![Frame { declared: MJPG_FRAME_SIZE_MAX + 1, payload: jpeg(1, 10) }],
        )]);
        let dir = tempdir().unwrap();
        assert!(matches!(
            FramestoreCodec::with_tracing(&mut store).import_from_device(dir.path()),
            Err(FramestoreError::FrameTooLarge { declared, capacity, .. })
                if declared == MJPG_FRAME_SIZE_MAX + 1 && capacity == MJPG_FRAME_SIZE_MAX
        ));
    }

    #[test]
    fn bad_magic_is_fatal() {
        let (mut store, _) = seed(vec![(
            PixelFormat::Compressed,
            vec![frame(jpeg(1, 10)), frame(vec![0x00, 0x11, 0x22, 0x33])],
        )]);
        let dir = tempdir().unwrap();
        match FramestoreCodec::with_tracing(&mut store).import_from_device(dir.path()) {
            Err(FramestoreError::MagicMismatch { segment, frame, have, need }) => {
                assert_eq!((segment, frame), (0, 1));
                assert_eq!(have, vec![0x00, 0x11]);
                assert_eq!(need, vec![0xFF, 0xD8]);
            }
            other => panic!("expected magic mismatch, got {:?}", other),
        }
        // frames before the corrupt one were already written
        assert!(dir.path().join("00/frame_0000.mjpg").exists());
    }

    #[test]
    fn unknown_format_code_is_fatal_before_any_output() {
        let (mut store, table) = seed(vec![(PixelFormat::Compressed, vec![frame(jpeg(1, 10))])]);
        let mut blobs = encode_table(&table);
        blobs.segment_formats[0] = b'X';
        write_blobs(&mut store, &blobs).unwrap();

        let dir = tempdir().unwrap();
        let target = dir.path().join("out");
        assert!(matches!(
            FramestoreCodec::with_tracing(&mut store).import_from_device(&target),
            Err(FramestoreError::Layout(LayoutError::UnknownFormat { segment: 0, raw: b'X' }))
        ));
        assert!(!target.exists());
    }

    #[test]
    fn segment_count_above_capacity_is_fatal() {
        let (mut store, _) = seed(vec![]);
        store.set_meta(MetaFile::SegmentCount, b"21".to_vec());
        let dir = tempdir().unwrap();
        assert!(matches!(
            FramestoreCodec::with_tracing(&mut store).import_from_device(dir.path()),
            Err(FramestoreError::Layout(LayoutError::TooManySegments { have: 21, .. }))
        ));
    }

    #[test]
    fn missing_metadata_is_io_error() {
        let mut store = MemoryStore::new(FDATA_MAX);
        let dir = tempdir().unwrap();
        assert!(matches!(
            FramestoreCodec::with_tracing(&mut store).import_from_device(dir.path()),
            Err(FramestoreError::Io(_))
        ));
    }

// ## 4️⃣ Stored offsets win

    #[test]
    fn non_prefix_offsets_are_followed_as_stored() {
        let (mut store, mut table) = seed(vec![
            (PixelFormat::Compressed, vec![frame(jpeg(1, 10))]),
            (PixelFormat::Compressed, vec![frame(jpeg(2, 10))]),
        ]);
        // move segment 1 one slot further and put a distinct payload there
        let moved = 2 * MJPG_FRAME_SIZE_MAX;
        table.data_offsets[1] = moved;
        store.write_arena(moved as u64, &jpeg(9, 10)).unwrap();
        write_blobs(&mut store, &encode_table(&table)).unwrap();

        let dir = tempdir().unwrap();
        FramestoreCodec::with_tracing(&mut store).import_from_device(dir.path()).unwrap();
        assert_eq!(fs::read(dir.path().join("01/frame_0000.mjpg")).unwrap(), jpeg(9, 10));
    }

    #[test]
    fn stale_tail_of_fixed_blobs_is_ignored() {
        let mut store = MemoryStore::new(FDATA_MAX).with_fixed_blobs();

        let mut big = SegmentTable::new();
        let view = big.push_segment(PixelFormat::Compressed, 3).unwrap();
        for j in 0..3 {
            big.push_frame_size(10);
            store.write_arena(view.frame_offset(j), &jpeg(j as u8, 10)).unwrap();
        }
        write_blobs(&mut store, &encode_table(&big)).unwrap();

        let mut small = SegmentTable::new();
        small.push_segment(PixelFormat::Compressed, 1).unwrap();
        small.push_frame_size(6);
        write_blobs(&mut store, &encode_table(&small)).unwrap();

        let dir = tempdir().unwrap();
        let report = FramestoreCodec::with_tracing(&mut store).import_from_device(dir.path()).unwrap();
        assert_eq!(report.frames_written, 1);
        assert_eq!(fs::read(dir.path().join("00/frame_0000.mjpg")).unwrap(), jpeg(0, 6));
    }

// ## 5️⃣ Raw-planar post hook

    #[test]
    fn post_hook_runs_once_per_raw_frame() {
        let (mut store, _) = seed(vec![
            (PixelFormat::RawPlanar, vec![frame(vec![1u8; S]), frame(vec![2u8; S])]),
            (PixelFormat::Compressed, vec![frame(jpeg(3, 20))]),
            (PixelFormat::RawPlanar, vec![frame(vec![4u8; S])]),
        ]);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);

        let dir = tempdir().unwrap();
        let root = dir.path().to_path_buf();
        FramestoreCodec::with_tracing(&mut store)
            .with_raw_post(move |p: &Path| {
                // file is already on disk when the hook runs
                assert_eq!(fs::metadata(p)?.len(), S as u64);
                log.borrow_mut().push(p.strip_prefix(&root).unwrap().to_path_buf());
                Ok(())
            })
            .import_from_device(dir.path())
            .unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![
                PathBuf::from("00/frame_0000.yuyv"),
                PathBuf::from("00/frame_0001.yuyv"),
                PathBuf::from("02/frame_0000.yuyv"),
            ]
        );
    }

    #[test]
    fn post_hook_error_aborts_import() {
        let (mut store, _) = seed(vec![(PixelFormat::RawPlanar, vec![frame(vec![1u8; S]), frame(vec![2u8; S])])]);
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);

        let dir = tempdir().unwrap();
        let result = FramestoreCodec::with_tracing(&mut store)
            .with_raw_post(move |p: &Path| {
                counter.set(counter.get() + 1);
                Err(FramestoreError::precondition(p, "converter failed"))
            })
            .import_from_device(dir.path());

        assert!(matches!(result, Err(FramestoreError::Precondition { .. })));
        assert_eq!(calls.get(), 1);
        assert!(!dir.path().join("00/frame_0001.yuyv").exists());
    }

    #[test]
    fn mirror_hook_flips_imported_frames() {
        use framestore_core::capture::{mirror_file, mirror_yuyv};
        use framestore_core::constants::geometry;

        let (w, h) = (geometry::YUYV.0 as usize, geometry::YUYV.1 as usize);
        let raw: Vec<u8> = (0..S).map(|i| (i % 251) as u8).collect();
        let (mut store, _) = seed(vec![(PixelFormat::RawPlanar, vec![frame(raw.clone())])]);

        let dir = tempdir().unwrap();
        FramestoreCodec::with_tracing(&mut store)
            .with_raw_post(move |p: &Path| Ok(mirror_file(p, w, h)?))
            .import_from_device(dir.path())
            .unwrap();

        let out = fs::read(dir.path().join("00/frame_0000.yuyv")).unwrap();
        assert_eq!(out, mirror_yuyv(&raw, w, h).unwrap());
    }
}
