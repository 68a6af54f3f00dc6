//! TCP transport for board clients.
//!
//! Frames are a `u32` little-endian length prefix followed by a JSON-encoded
//! message. JSON rather than a compact binary codec because strip payloads
//! carry a free-form attribute bag that only a self-describing format can
//! round-trip.

use std::net::SocketAddr;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use stripboard_proto::ClientMsg;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::core::BoardCore;
use crate::service::BoardService;

/// Upper bound on a single frame's payload length.
pub const MAX_FRAME_LEN: u32 = 1024 * 1024;

/// Framing or codec failure on a client connection.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
	/// Transport-level read or write failure.
	#[error("i/o error: {0}")]
	Io(#[from] std::io::Error),
	/// Payload bytes that are not valid JSON for the expected message.
	#[error("codec error: {0}")]
	Codec(#[from] serde_json::Error),
	/// Length prefix beyond [`MAX_FRAME_LEN`].
	#[error("frame of {len} bytes exceeds the frame limit")]
	Oversize {
		/// The declared payload length.
		len: u32,
	},
}

/// Read one length-prefixed JSON frame.
///
/// # Errors
///
/// Returns [`FrameError::Io`] on transport failure (including EOF),
/// [`FrameError::Oversize`] for an implausible length prefix, and
/// [`FrameError::Codec`] when the payload is not valid JSON for `T`. A codec
/// error leaves the stream aligned on the next frame.
pub async fn read_frame<R, T>(reader: &mut R) -> Result<T, FrameError>
where
	R: AsyncRead + Unpin,
	T: DeserializeOwned,
{
	let len = reader.read_u32_le().await?;
	if len > MAX_FRAME_LEN {
		return Err(FrameError::Oversize { len });
	}
	let mut buf = vec![0u8; len as usize];
	reader.read_exact(&mut buf).await?;
	Ok(serde_json::from_slice(&buf)?)
}

/// Write one length-prefixed JSON frame.
///
/// # Errors
///
/// Returns [`FrameError::Codec`] if the message fails to serialize and
/// [`FrameError::Io`] on transport failure.
pub async fn write_frame<W, T>(writer: &mut W, msg: &T) -> Result<(), FrameError>
where
	W: AsyncWrite + Unpin,
	T: Serialize,
{
	let buf = serde_json::to_vec(msg)?;
	writer.write_u32_le(buf.len() as u32).await?;
	writer.write_all(&buf).await?;
	writer.flush().await?;
	Ok(())
}

/// Start the board server on a TCP listener.
///
/// Accepts connections until `shutdown` is cancelled; each connection runs on
/// its own task against the shared `core`.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound.
pub async fn serve(
	addr: SocketAddr,
	core: Arc<BoardCore>,
	shutdown: CancellationToken,
) -> std::io::Result<()> {
	let listener = TcpListener::bind(addr).await?;
	tracing::info!(addr = %listener.local_addr()?, "board server listening");

	loop {
		tokio::select! {
			_ = shutdown.cancelled() => {
				tracing::info!("board server shutting down");
				break;
			}
			res = listener.accept() => {
				match res {
					Ok((stream, peer)) => {
						tracing::info!(%peer, "new board connection");
						tokio::spawn(handle_connection(stream, core.clone()));
					}
					Err(e) => {
						tracing::error!(error = %e, "failed to accept connection");
					}
				}
			}
		}
	}

	Ok(())
}

/// Handle a single board client connection.
///
/// Inbound frames are decoded and routed through a [`BoardService`]; outbound
/// events drain from the session's sink on a dedicated writer task. Dropping
/// the service on exit unregisters the session, which in turn closes the
/// sink and lets the writer task finish.
pub(crate) async fn handle_connection(stream: TcpStream, core: Arc<BoardCore>) {
	let (reader, mut writer) = stream.into_split();
	let mut reader = tokio::io::BufReader::new(reader);

	let (tx, mut rx) = mpsc::unbounded_channel();
	let service = BoardService::new(core, tx);
	let session_id = service.session_id();

	let writer_task = tokio::spawn(async move {
		while let Some(msg) = rx.recv().await {
			if let Err(e) = write_frame(&mut writer, &msg).await {
				tracing::debug!(error = %e, "board connection write failed");
				break;
			}
		}
	});

	loop {
		match read_frame::<_, ClientMsg>(&mut reader).await {
			Ok(msg) => service.handle(msg),
			Err(FrameError::Codec(e)) => {
				tracing::debug!(?session_id, error = %e, "skipping malformed frame");
			}
			Err(FrameError::Oversize { len }) => {
				tracing::warn!(?session_id, len, "oversize frame, closing connection");
				break;
			}
			Err(FrameError::Io(_)) => break,
		}
	}

	drop(service);
	let _ = writer_task.await;
	tracing::info!(?session_id, "board connection closed");
}

#[cfg(test)]
mod tests {
	use stripboard_proto::ServerMsg;
	use tokio::net::TcpStream;

	use super::*;

	async fn spawn_server(core: Arc<BoardCore>) -> (TcpStream, tokio::task::JoinHandle<()>) {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		let accept = tokio::spawn(async move { listener.accept().await.unwrap().0 });
		let client = TcpStream::connect(addr).await.unwrap();
		let server = accept.await.unwrap();
		let task = tokio::spawn(handle_connection(server, core));
		(client, task)
	}

	#[tokio::test]
	async fn joining_a_room_yields_initial_snapshots() {
		let core = BoardCore::new();
		let (mut client, task) = spawn_server(core.clone()).await;

		write_frame(&mut client, &ClientMsg::SelectAirport("EGLL".to_string()))
			.await
			.unwrap();

		let first: ServerMsg = read_frame(&mut client).await.unwrap();
		let ServerMsg::InitialStrips(strips) = first else {
			panic!("expected initial-strips");
		};
		assert!(strips.is_empty());

		let second: ServerMsg = read_frame(&mut client).await.unwrap();
		let ServerMsg::InitialSpacers(spacers) = second else {
			panic!("expected initial-spacers");
		};
		assert_eq!(spacers.len(), 4);

		drop(client);
		task.await.expect("server task panicked");
	}

	#[tokio::test]
	async fn disconnect_unregisters_the_session() {
		let core = BoardCore::new();
		let (mut client, task) = spawn_server(core.clone()).await;

		// Round-trip a join so the connection task has provably registered
		// the session before we count it.
		write_frame(&mut client, &ClientMsg::SelectAirport("EGLL".to_string()))
			.await
			.unwrap();
		let _: ServerMsg = read_frame(&mut client).await.unwrap();
		assert_eq!(core.sessions_count(), 1);

		drop(client);
		task.await.expect("server task panicked");
		assert_eq!(core.sessions_count(), 0);
	}

	#[tokio::test]
	async fn malformed_frame_is_skipped() {
		let core = BoardCore::new();
		let (mut client, task) = spawn_server(core.clone()).await;

		// Not valid JSON; the connection must survive it.
		client.write_u32_le(4).await.unwrap();
		client.write_all(b"\xff\xff\xff\xff").await.unwrap();

		write_frame(&mut client, &ClientMsg::SelectAirport("KJFK".to_string()))
			.await
			.unwrap();
		let first: ServerMsg = read_frame(&mut client).await.unwrap();
		assert!(matches!(first, ServerMsg::InitialStrips(_)));

		drop(client);
		task.await.expect("server task panicked");
	}
}
