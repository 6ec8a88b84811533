use std::io::{self, BufRead};
use std::thread;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

const LINE_BUFFER: usize = 16;

/// Lines typed on standard input.
pub fn stdin_lines() -> ReceiverStream<io::Result<String>> {
    spawn_line_reader(io::BufReader::new(io::stdin()))
}

/// Read `source` line by line on a plain thread.
///
/// A blocked read never holds up runtime shutdown: the thread is detached and
/// ends with the process. It stops after the first error or once the stream
/// is dropped and another line arrives.
pub fn spawn_line_reader<R>(source: R) -> ReceiverStream<io::Result<String>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(LINE_BUFFER);

    thread::spawn(move || {
        for line in source.lines() {
            let failed = line.is_err();
            if tx.blocking_send(line).is_err() || failed {
                break;
            }
        }
    });

    ReceiverStream::new(rx)
}
