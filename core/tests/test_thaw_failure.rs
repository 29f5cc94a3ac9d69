// Thaw failures: the backing file vanished, shrank, or was never there.
// The error must be `Reconstruction` with the real cause inside, and a
// half-built stream must not keep the file open.

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;
    use std::thread;

    use picklable_core::prelude::*;

    /// Open descriptors of this process that point anywhere under `dir`
    /// (Linux only). Unlinked targets show up as `<path> (deleted)`, which
    /// still sits under `dir`.
    #[cfg(target_os = "linux")]
    fn open_handles_under(dir: &Path) -> usize {
        let root = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
        fs::read_dir("/proc/self/fd")
            .unwrap()
            .filter_map(|e| e.ok())
            .filter_map(|e| fs::read_link(e.path()).ok())
            .filter(|link| link.starts_with(&root))
            .count()
    }

    #[test]
    fn deleted_file_gives_reconstruction_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.txt");
        fs::write(&path, "abc\ndef\n").unwrap();

        let mut stream = pickle_open(&path, "r").unwrap();
        stream.as_text().unwrap().readline().unwrap();
        let snapshot = stream.freeze().unwrap();
        drop(stream);

        fs::remove_file(&path).unwrap();
        let err = snapshot.thaw().unwrap_err();
        #[cfg(target_os = "linux")]
        assert_eq!(open_handles_under(dir.path()), 0, "failed thaw leaked a file handle");
        match &err {
            StreamError::Reconstruction { path: p, source } => {
                assert_eq!(p, &path);
                assert!(matches!(**source, StreamError::NotFound { .. }));
            }
            other => panic!("expected Reconstruction, got {other:?}"),
        }
        assert!(err.is_not_found());
    }

    #[test]
    fn original_stream_survives_failed_thaw() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.bin");
        fs::write(&path, b"0123456789").unwrap();

        let mut original = BufferedStream::open(&path).unwrap();
        original.read(3).unwrap();
        let mut snapshot = original.freeze().unwrap();
        snapshot.name = dir.path().join("elsewhere.bin");

        assert!(BufferedStream::thaw(&snapshot).is_err());
        assert_eq!(original.read(3).unwrap(), b"345");
    }

    #[test]
    fn truncated_file_is_position_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shrinks.bin");
        fs::write(&path, vec![7u8; 500]).unwrap();

        let mut stream = pickle_open(&path, "rb").unwrap();
        stream.as_binary().unwrap().read(400).unwrap();
        let snapshot = stream.freeze().unwrap();
        drop(stream);

        fs::write(&path, vec![7u8; 100]).unwrap();
        let err = PickleStream::thaw(&snapshot).unwrap_err();
        assert!(matches!(
            err.root_cause(),
            StreamError::PositionOutOfRange { position: 400, len: 100 }
        ));

        #[cfg(target_os = "linux")]
        assert_eq!(open_handles_under(dir.path()), 0, "failed thaw leaked a file handle");
    }

    #[test]
    fn text_thaw_inside_multibyte_char_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("u.txt");
        fs::write(&path, "aé").unwrap();

        let forged = WrappedSnapshot { inner: LeafKind::Raw, name: path.clone(), position: 2 };
        let err = TextStream::thaw(&forged).unwrap_err();
        assert!(matches!(err.root_cause(), StreamError::InvalidPosition { position: 2 }));

        #[cfg(target_os = "linux")]
        assert_eq!(open_handles_under(dir.path()), 0, "failed thaw leaked a file handle");
    }

    #[test]
    fn position_at_exact_end_is_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("end.txt");
        fs::write(&path, "xyz").unwrap();

        let snapshot = RawSnapshot { name: path, position: 3 };
        let mut raw = RawStream::thaw(&snapshot).unwrap();
        assert!(raw.read_all().unwrap().is_empty());
    }

    #[test]
    fn snapshot_thaws_on_another_thread() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.txt");
        fs::write(&path, "first\nsecond\nthird\n").unwrap();

        let mut stream = pickle_open(&path, "r").unwrap();
        stream.as_text().unwrap().readline().unwrap();
        let snapshot = stream.freeze().unwrap();

        let line = thread::spawn(move || {
            let mut restored = snapshot.thaw().unwrap();
            restored.as_text().unwrap().readline().unwrap()
        })
        .join()
        .unwrap();
        assert_eq!(line, "second\n");

        // Streams themselves move across threads as well.
        let handle = thread::spawn(move || stream.as_text().unwrap().readline().unwrap());
        assert_eq!(handle.join().unwrap(), "second\n");
    }
}
