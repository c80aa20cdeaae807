//! Every adapter operation reaches its callback once, unmodified, and returns
//! the callback's result unchanged.

use std::sync::{Arc, Mutex};

use crate::{
    Access, CallbackTable, ImemError, ImemProtocol, OpenFlags, ReadWait, UrlContext, Whence,
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Open {
        ctx: usize,
        url: String,
        flags: OpenFlags,
    },
    Read {
        ctx: usize,
        buf: usize,
        len: usize,
        wait: ReadWait,
    },
    Write {
        ctx: usize,
        buf: usize,
        len: usize,
    },
    Seek {
        ctx: usize,
        pos: i64,
        whence: Whence,
    },
    Close {
        ctx: usize,
    },
    GetHandle {
        ctx: usize,
    },
    Check {
        ctx: usize,
        mask: Access,
    },
}

type Log = Arc<Mutex<Vec<Call>>>;

fn addr(ctx: &UrlContext) -> usize {
    ctx as *const UrlContext as usize
}

fn recording_table(log: &Log) -> CallbackTable {
    let (l1, l2, l3, l4, l5, l6, l7) = (
        log.clone(),
        log.clone(),
        log.clone(),
        log.clone(),
        log.clone(),
        log.clone(),
        log.clone(),
    );
    CallbackTable::new()
        .with_open(move |ctx, url, flags| {
            l1.lock().unwrap().push(Call::Open {
                ctx: addr(ctx),
                url: url.to_string(),
                flags,
            });
            Ok(())
        })
        .with_read(move |ctx, buf, wait| {
            l2.lock().unwrap().push(Call::Read {
                ctx: addr(ctx),
                buf: buf.as_ptr() as usize,
                len: buf.len(),
                wait,
            });
            Ok(7)
        })
        .with_write(move |ctx, buf| {
            l3.lock().unwrap().push(Call::Write {
                ctx: addr(ctx),
                buf: buf.as_ptr() as usize,
                len: buf.len(),
            });
            Ok(5)
        })
        .with_seek(move |ctx, pos, whence| {
            l4.lock().unwrap().push(Call::Seek {
                ctx: addr(ctx),
                pos,
                whence,
            });
            Ok(1234)
        })
        .with_close(move |ctx| {
            l5.lock().unwrap().push(Call::Close { ctx: addr(ctx) });
            Ok(())
        })
        .with_get_handle(move |ctx| {
            l6.lock().unwrap().push(Call::GetHandle { ctx: addr(ctx) });
            Ok(42)
        })
        .with_check(move |ctx, mask| {
            l7.lock().unwrap().push(Call::Check {
                ctx: addr(ctx),
                mask,
            });
            Ok(Access::READ)
        })
}

fn setup() -> (Log, ImemProtocol, UrlContext) {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let protocol = ImemProtocol::new(Arc::new(recording_table(&log)));
    let ctx = UrlContext::new("imem:clip", OpenFlags::read_write());
    (log, protocol, ctx)
}

#[test]
fn read_forwards_buffer_and_returns_callback_value() {
    let (log, protocol, mut ctx) = setup();
    let mut buf = [0u8; 16];

    let n = protocol.read(&mut ctx, &mut buf).expect("read");

    assert_eq!(n, 7);
    let calls = log.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![Call::Read {
            ctx: addr(&ctx),
            buf: buf.as_ptr() as usize,
            len: 16,
            wait: ReadWait::Timeout(crate::DEFAULT_READ_TIMEOUT),
        }]
    );
}

#[test]
fn write_forwards_buffer_and_returns_callback_value() {
    let (log, protocol, mut ctx) = setup();
    let data = b"payload";

    let n = protocol.write(&mut ctx, data).expect("write");

    assert_eq!(n, 5, "short write count must not be adjusted");
    let calls = log.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![Call::Write {
            ctx: addr(&ctx),
            buf: data.as_ptr() as usize,
            len: data.len(),
        }]
    );
}

#[test]
fn get_handle_forwards_once() {
    let (log, protocol, mut ctx) = setup();

    assert_eq!(protocol.get_handle(&mut ctx).expect("handle"), 42);
    assert_eq!(
        log.lock().unwrap().clone(),
        vec![Call::GetHandle { ctx: addr(&ctx) }]
    );
}

#[test]
fn check_returns_satisfied_mask_unchanged() {
    let (log, protocol, mut ctx) = setup();

    let satisfied = protocol
        .check(&mut ctx, Access::READ | Access::WRITE | Access::EXISTS)
        .expect("check");

    // The request exceeds what is satisfied; the adapter must not widen it.
    assert_eq!(satisfied, Access::READ);
    assert_eq!(
        log.lock().unwrap().clone(),
        vec![Call::Check {
            ctx: addr(&ctx),
            mask: Access::ALL,
        }]
    );
}

#[cfg(feature = "protocol")]
#[test]
fn open_forwards_url_and_flags_verbatim() {
    let (log, protocol, mut ctx) = setup();
    let flags = OpenFlags::write_only().nonblocking();

    // The URL passed to open is forwarded as given, even if it differs from
    // the one the context was created with.
    protocol
        .open(&mut ctx, "imem://other?blocksize=3", flags)
        .expect("open");

    assert_eq!(
        log.lock().unwrap().clone(),
        vec![Call::Open {
            ctx: addr(&ctx),
            url: "imem://other?blocksize=3".into(),
            flags,
        }]
    );
}

#[cfg(feature = "protocol")]
#[test]
fn seek_and_close_forward_once() {
    let (log, protocol, mut ctx) = setup();

    assert_eq!(protocol.seek(&mut ctx, -9, Whence::End).expect("seek"), 1234);
    protocol.close(&mut ctx).expect("close");

    assert_eq!(
        log.lock().unwrap().clone(),
        vec![
            Call::Seek {
                ctx: addr(&ctx),
                pos: -9,
                whence: Whence::End,
            },
            Call::Close { ctx: addr(&ctx) },
        ]
    );
}

#[cfg(feature = "protocol")]
#[test]
fn double_close_is_forwarded_twice() {
    let (log, protocol, mut ctx) = setup();

    protocol.close(&mut ctx).expect("first close");
    protocol.close(&mut ctx).expect("second close");

    assert_eq!(log.lock().unwrap().len(), 2);
}

#[cfg(feature = "protocol")]
#[test]
fn url_protocol_surface_names_scheme_and_options() {
    use crate::UrlProtocol;

    let (log, protocol, mut ctx) = setup();
    let dyn_protocol: &dyn UrlProtocol = &protocol;

    assert_eq!(dyn_protocol.name(), "imem");
    let names: Vec<&str> = dyn_protocol.options().iter().map(|o| o.name).collect();
    assert_eq!(names, vec!["truncate", "blocksize"]);

    let mut buf = [0u8; 4];
    assert_eq!(dyn_protocol.read(&mut ctx, &mut buf).expect("read"), 7);
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[test]
fn errors_pass_through_untranslated() {
    let table = CallbackTable::new()
        .with_read(|_ctx, _buf, _wait| Err(ImemError::Code(-1234)))
        .with_write(|_ctx, _buf| Err(ImemError::InvalidSeek { offset: 9 }));
    let protocol = ImemProtocol::new(Arc::new(table));
    let mut ctx = UrlContext::new("imem:x", OpenFlags::read_write());

    let mut buf = [0u8; 1];
    match protocol.read(&mut ctx, &mut buf) {
        Err(ImemError::Code(c)) => assert_eq!(c, -1234),
        other => panic!("expected Code(-1234), got: {other:?}"),
    }
    match protocol.write(&mut ctx, b"x") {
        Err(ImemError::InvalidSeek { offset }) => assert_eq!(offset, 9),
        other => panic!("expected InvalidSeek, got: {other:?}"),
    }
}

#[test]
fn adapter_does_not_clip_to_blocksize() {
    let table = CallbackTable::new().with_read(|_ctx, buf, _wait| Ok(buf.len()));
    let protocol = ImemProtocol::new(Arc::new(table));
    let mut ctx = UrlContext::new("imem:x", OpenFlags::read_only())
        .with_options(crate::ImemOptions::default().with_blocksize(4));

    let mut buf = [0u8; 64];
    assert_eq!(protocol.read(&mut ctx, &mut buf).expect("read"), 64);
}
