//! `tokio-serial` backed host and transport.

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio_serial::{
    ClearBuffer, DataBits, FlowControl, Parity, SerialPort, SerialPortBuilderExt, SerialStream,
    StopBits,
};
use tracing::{debug, info};

use crate::decoder::Utf8ChunkDecoder;
use crate::error::Error;
use crate::port::{PortInfo, list_ports};
use crate::transport::{DEFAULT_READ_BUFFER_SIZE, SerialHost, SerialTransport, TransportConfig};

/// How [`NativeHost`] picks a device.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PortSelection {
    /// First USB serial device, else the first device of any kind.
    #[default]
    Auto,
    /// A specific device path or name.
    Named(String),
}

/// Pick a port from an enumerated list.
///
/// A named port is accepted even when enumeration did not report it, since
/// virtual devices (ptys, socat links) are often invisible to enumeration.
pub fn select_port(selection: &PortSelection, ports: &[PortInfo]) -> Result<String, Error> {
    match selection {
        PortSelection::Named(name) => {
            if !ports.iter().any(|p| &p.name == name) {
                debug!(port = %name, "named port not enumerated, trying it anyway");
            }
            Ok(name.clone())
        }
        PortSelection::Auto => ports
            .iter()
            .find(|p| p.kind.is_usb())
            .or_else(|| ports.first())
            .map(|p| p.name.clone())
            .ok_or(Error::NoPorts),
    }
}

/// Host backed by the operating system's serial stack.
#[derive(Debug, Clone, Default)]
pub struct NativeHost {
    selection: PortSelection,
}

impl NativeHost {
    pub fn new(selection: PortSelection) -> Self {
        Self { selection }
    }

    pub fn selection(&self) -> &PortSelection {
        &self.selection
    }
}

#[async_trait]
impl SerialHost for NativeHost {
    async fn request_port(&self) -> Result<Box<dyn SerialTransport>, Error> {
        let ports = match &self.selection {
            // Enumeration is only a hint when the caller already named a port.
            PortSelection::Named(_) => list_ports().unwrap_or_default(),
            PortSelection::Auto => list_ports()?,
        };
        let name = select_port(&self.selection, &ports)?;
        debug!(port = %name, "selected serial port");
        Ok(Box::new(NativeTransport::new(name)))
    }
}

/// Read until the decoder yields text. Reads that end inside a multi-byte
/// character are absorbed; `Ok(None)` means end of stream.
async fn read_decoded<R>(
    reader: &mut R,
    buf: &mut [u8],
    decoder: &mut Utf8ChunkDecoder,
) -> Result<Option<String>, Error>
where
    R: AsyncRead + Unpin + ?Sized,
{
    loop {
        let n = reader.read(buf).await?;
        if n == 0 {
            // A dangling partial character is flushed once; the next call
            // sees EOF again and reports end of stream.
            return Ok(decoder.finish());
        }

        let text = decoder.decode(&buf[..n]);
        if !text.is_empty() {
            return Ok(Some(text));
        }
    }
}

/// A serial device opened through `tokio-serial`.
pub struct NativeTransport {
    name: String,
    stream: Option<SerialStream>,
    decoder: Utf8ChunkDecoder,
    buf: Vec<u8>,
}

impl NativeTransport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stream: None,
            decoder: Utf8ChunkDecoder::new(),
            buf: vec![0; DEFAULT_READ_BUFFER_SIZE],
        }
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

#[async_trait]
impl SerialTransport for NativeTransport {
    fn port_name(&self) -> &str {
        &self.name
    }

    async fn open(&mut self, config: &TransportConfig) -> Result<(), Error> {
        let stream = tokio_serial::new(&self.name, config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .open_native_async()
            .map_err(|source| Error::Open {
                port: self.name.clone(),
                source,
            })?;

        self.buf = vec![0; config.read_buffer_size.max(1)];
        self.decoder = Utf8ChunkDecoder::new();
        self.stream = Some(stream);
        info!(port = %self.name, baud = config.baud_rate, "serial port opened");
        Ok(())
    }

    async fn read_chunk(&mut self) -> Result<Option<String>, Error> {
        let stream = self.stream.as_mut().ok_or(Error::Closed)?;
        read_decoded(stream, &mut self.buf, &mut self.decoder).await
    }

    async fn cancel_read(&mut self) -> Result<(), Error> {
        let stream = self.stream.as_mut().ok_or(Error::Closed)?;
        stream
            .clear(ClearBuffer::Input)
            .map_err(|e| Error::Control(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), Error> {
        let mut stream = self.stream.take().ok_or(Error::Closed)?;
        let flushed = stream.flush().await;
        drop(stream);
        info!(port = %self.name, "serial port released");
        flushed.map_err(Error::from)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::port::PortKind;

    fn port(name: &str, kind: PortKind) -> PortInfo {
        PortInfo {
            name: name.into(),
            kind,
        }
    }

    fn usb_kind() -> PortKind {
        PortKind::Usb {
            vid: 0x2341,
            pid: 0x0043,
            manufacturer: None,
            product: None,
            serial_number: None,
        }
    }

    #[test]
    fn auto_prefers_usb() {
        let ports = vec![
            port("/dev/ttyS0", PortKind::Unknown),
            port("/dev/ttyACM0", usb_kind()),
        ];
        assert_eq!(
            select_port(&PortSelection::Auto, &ports).unwrap(),
            "/dev/ttyACM0"
        );
    }

    #[test]
    fn auto_falls_back_to_first_port() {
        let ports = vec![
            port("/dev/ttyS0", PortKind::Unknown),
            port("/dev/ttyS1", PortKind::Pci),
        ];
        assert_eq!(
            select_port(&PortSelection::Auto, &ports).unwrap(),
            "/dev/ttyS0"
        );
    }

    #[test]
    fn auto_with_no_ports_fails() {
        assert!(matches!(
            select_port(&PortSelection::Auto, &[]),
            Err(Error::NoPorts)
        ));
    }

    #[test]
    fn named_port_is_used_even_if_not_enumerated() {
        let selection = PortSelection::Named("/dev/pts/7".into());
        assert_eq!(select_port(&selection, &[]).unwrap(), "/dev/pts/7");
    }

    #[tokio::test]
    async fn split_character_is_held_until_complete() {
        // "23.5°" with the degree sign split across two reads.
        let mut reader = tokio_test::io::Builder::new()
            .read(b"23.5\xc2")
            .read(b"\xb0,40\n")
            .build();
        let mut buf = [0u8; 16];
        let mut decoder = Utf8ChunkDecoder::new();

        let first = read_decoded(&mut reader, &mut buf, &mut decoder).await.unwrap();
        assert_eq!(first.as_deref(), Some("23.5"));
        let second = read_decoded(&mut reader, &mut buf, &mut decoder).await.unwrap();
        assert_eq!(second.as_deref(), Some("°,40\n"));
        assert_eq!(
            read_decoded(&mut reader, &mut buf, &mut decoder).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn lone_continuation_read_is_absorbed() {
        let mut reader = tokio_test::io::Builder::new()
            .read(b"\xe2")
            .read(b"\x82")
            .read(b"\xac\n")
            .build();
        let mut buf = [0u8; 16];
        let mut decoder = Utf8ChunkDecoder::new();

        let text = read_decoded(&mut reader, &mut buf, &mut decoder).await.unwrap();
        assert_eq!(text.as_deref(), Some("€\n"));
    }

    #[tokio::test]
    async fn truncated_character_is_flushed_at_eof() {
        let mut reader = tokio_test::io::Builder::new().read(b"ok\xc3").build();
        let mut buf = [0u8; 16];
        let mut decoder = Utf8ChunkDecoder::new();

        assert_eq!(
            read_decoded(&mut reader, &mut buf, &mut decoder).await.unwrap().as_deref(),
            Some("ok")
        );
        assert_eq!(
            read_decoded(&mut reader, &mut buf, &mut decoder).await.unwrap().as_deref(),
            Some("\u{FFFD}")
        );
        assert_eq!(
            read_decoded(&mut reader, &mut buf, &mut decoder).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn unopened_transport_reports_closed() {
        let mut transport = NativeTransport::new("/dev/ttyACM0");
        assert!(!transport.is_open());
        assert_eq!(transport.port_name(), "/dev/ttyACM0");
        assert!(matches!(transport.read_chunk().await, Err(Error::Closed)));
        assert!(matches!(transport.cancel_read().await, Err(Error::Closed)));
        assert!(matches!(transport.close().await, Err(Error::Closed)));
    }
}
