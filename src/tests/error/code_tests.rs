//! Tests for the host status-code convention.

use std::io;

use crate::error::{ImemError, Operation, PROTOCOL_NOT_FOUND, status};

#[test]
fn unconfigured_maps_to_protocol_not_found_tag() {
    assert_eq!(PROTOCOL_NOT_FOUND, -0x4F52_50F8);
    let err = ImemError::Unconfigured {
        op: Operation::Seek,
    };
    assert_eq!(err.code(), PROTOCOL_NOT_FOUND);
    assert!(err.to_string().contains("'seek'"));
}

#[test]
fn errno_style_codes() {
    assert_eq!(ImemError::WouldBlock.code(), -libc::EAGAIN);
    assert_eq!(ImemError::NotOpen.code(), -libc::EBADF);
    assert_eq!(
        ImemError::Unsupported {
            op: Operation::GetHandle
        }
        .code(),
        -libc::ENOSYS
    );
    assert_eq!(ImemError::InvalidSeek { offset: -1 }.code(), -libc::EINVAL);
    assert_eq!(ImemError::Code(-1234).code(), -1234);
    assert_eq!(
        ImemError::Io(io::Error::from(io::ErrorKind::NotFound)).code(),
        -libc::ENOENT
    );
}

#[test]
fn from_code_recognises_would_block_and_keeps_the_rest() {
    assert!(ImemError::from_code(-libc::EAGAIN).is_would_block());
    assert!(matches!(
        ImemError::from_code(-libc::ETIMEDOUT),
        ImemError::TimedOut
    ));
    match ImemError::from_code(-9999) {
        ImemError::Code(c) => assert_eq!(c, -9999),
        other => panic!("expected Code, got: {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn os_would_block_round_trips_through_status_code() {
    let err = ImemError::Io(io::Error::from_raw_os_error(libc::EAGAIN));
    assert!(err.is_would_block());

    let code = err.code();
    assert_eq!(code, ImemError::WouldBlock.code());
    assert!(ImemError::from_code(code).is_would_block());
    assert!(ImemError::Code(code).is_would_block());
}

#[test]
fn status_collapses_results() {
    assert_eq!(status::<usize>(Ok(17)), 17);
    assert_eq!(
        status::<u64>(Err(ImemError::WouldBlock)),
        i64::from(-libc::EAGAIN)
    );
    assert_eq!(status::<u64>(Ok(u64::MAX)), i64::MAX);
}

#[test]
fn converts_to_io_error_kinds() {
    let kind = |e: ImemError| io::Error::from(e).kind();
    assert_eq!(kind(ImemError::WouldBlock), io::ErrorKind::WouldBlock);
    assert_eq!(
        kind(ImemError::Code(-libc::EAGAIN)),
        io::ErrorKind::WouldBlock
    );
    assert_eq!(
        kind(ImemError::Code(-libc::EINTR)),
        io::ErrorKind::Interrupted
    );
    assert_eq!(kind(ImemError::TimedOut), io::ErrorKind::TimedOut);
    assert_eq!(
        kind(ImemError::Unconfigured {
            op: Operation::Read
        }),
        io::ErrorKind::Unsupported
    );
    assert_eq!(
        kind(ImemError::NotFound { url: "imem:x".into() }),
        io::ErrorKind::NotFound
    );
}

#[test]
fn interrupted_detection() {
    assert!(ImemError::Io(io::Error::from(io::ErrorKind::Interrupted)).is_interrupted());
    assert!(ImemError::Code(-libc::EINTR).is_interrupted());
    assert!(!ImemError::WouldBlock.is_interrupted());
}
