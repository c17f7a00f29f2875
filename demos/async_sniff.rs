//! Async protocol sniffing with several streams in flight.
//!
//! Peeks the first byte of each stream to pick a decoder, then reads the
//! full payload.
//!
//! Run with:
//!     cargo run --example async_sniff --features async-io

use futures_util::io::AsyncReadExt;
use peekrs::peekable_async;
use tokio_util::compat::TokioAsyncReadCompatExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let streams: Vec<Vec<u8>> = vec![
        br#"{"kind":"json"}"#.to_vec(),
        b"\x16\x03\x01\x00\x05hello".to_vec(),
        b"GET / HTTP/1.1\r\n\r\n".to_vec(),
    ];

    println!("Sniffing {} streams concurrently...\n", streams.len());

    let handles: Vec<_> = streams
        .into_iter()
        .enumerate()
        .map(|(stream_id, data)| {
            tokio::spawn(async move {
                let (mut tx, rx) = tokio::io::duplex(8);
                tokio::spawn(async move {
                    use tokio::io::AsyncWriteExt;
                    tx.write_all(&data).await
                });

                let mut reader = peekable_async(rx.compat());
                let kind = match reader.peek_byte().await? {
                    Some(b'{') => "json",
                    Some(0x16) => "tls handshake",
                    Some(b'A'..=b'Z') => "http",
                    Some(_) => "unknown",
                    None => "empty",
                };

                let mut payload = Vec::new();
                reader.read_to_end(&mut payload).await?;
                Ok::<_, std::io::Error>((stream_id, kind, payload.len()))
            })
        })
        .collect();

    for handle in handles {
        let (stream_id, kind, len) = handle.await??;
        println!("Stream {}: {} ({} bytes)", stream_id, kind, len);
    }

    Ok(())
}
