//! Serial port discovery.

use serde::Serialize;
use serialport::{SerialPortInfo, SerialPortType};

use crate::error::Error;

/// A serial device the host can see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortInfo {
    pub name: String,
    pub kind: PortKind,
}

/// How the device is attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PortKind {
    Usb {
        vid: u16,
        pid: u16,
        manufacturer: Option<String>,
        product: Option<String>,
        serial_number: Option<String>,
    },
    Bluetooth,
    Pci,
    Unknown,
}

impl PortKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Usb { .. } => "usb",
            Self::Bluetooth => "bluetooth",
            Self::Pci => "pci",
            Self::Unknown => "unknown",
        }
    }

    pub fn is_usb(&self) -> bool {
        matches!(self, Self::Usb { .. })
    }
}

impl PortInfo {
    /// One-line human description, e.g. `USB 2341:0043 Arduino Uno`.
    pub fn description(&self) -> String {
        match &self.kind {
            PortKind::Usb {
                vid,
                pid,
                manufacturer,
                product,
                ..
            } => {
                let label = product.as_deref().or(manufacturer.as_deref()).unwrap_or("");
                format!("USB {vid:04x}:{pid:04x} {label}").trim_end().to_string()
            }
            PortKind::Bluetooth => "Bluetooth".into(),
            PortKind::Pci => "PCI".into(),
            PortKind::Unknown => String::new(),
        }
    }
}

impl From<SerialPortInfo> for PortInfo {
    fn from(info: SerialPortInfo) -> Self {
        let kind = match info.port_type {
            SerialPortType::UsbPort(usb) => PortKind::Usb {
                vid: usb.vid,
                pid: usb.pid,
                manufacturer: usb.manufacturer,
                product: usb.product,
                serial_number: usb.serial_number,
            },
            SerialPortType::BluetoothPort => PortKind::Bluetooth,
            SerialPortType::PciPort => PortKind::Pci,
            SerialPortType::Unknown => PortKind::Unknown,
        };
        Self {
            name: info.port_name,
            kind,
        }
    }
}

/// Enumerate serial ports, sorted by name.
///
/// Enumeration failing outright means the host has no serial capability we
/// can use, so it maps to [`Error::Unsupported`].
pub fn list_ports() -> Result<Vec<PortInfo>, Error> {
    let mut ports: Vec<PortInfo> = serialport::available_ports()
        .map_err(|e| Error::Unsupported {
            reason: e.to_string(),
        })?
        .into_iter()
        .map(PortInfo::from)
        .collect();
    ports.sort_by(|a, b| a.name.cmp(&b.name));
    tracing::debug!(count = ports.len(), "enumerated serial ports");
    Ok(ports)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usb(product: Option<&str>) -> PortInfo {
        PortInfo {
            name: "/dev/ttyACM0".into(),
            kind: PortKind::Usb {
                vid: 0x2341,
                pid: 0x0043,
                manufacturer: Some("Arduino (www.arduino.cc)".into()),
                product: product.map(Into::into),
                serial_number: None,
            },
        }
    }

    #[test]
    fn usb_description_prefers_product() {
        assert_eq!(usb(Some("Arduino Uno")).description(), "USB 2341:0043 Arduino Uno");
    }

    #[test]
    fn usb_description_falls_back_to_manufacturer() {
        assert_eq!(
            usb(None).description(),
            "USB 2341:0043 Arduino (www.arduino.cc)"
        );
    }

    #[test]
    fn kind_labels() {
        assert_eq!(usb(None).kind.label(), "usb");
        assert!(usb(None).kind.is_usb());
        assert_eq!(PortKind::Pci.label(), "pci");
        assert!(!PortKind::Unknown.is_usb());
    }
}
