//! Device table and the mount/unmount bridge into the tree
//!
//! Devices can be listed without touching the tree. Only `mount` and
//! `unmount` reach across into the `Vfs`.

use super::path::{is_within, join, split_parent};
use super::tree::{FsError, Vfs};
use crate::data::Device;
use serde::{Deserialize, Serialize};

/// File extensions treated as forensic disk images
const IMAGE_EXTENSIONS: &[&str] = &["img", "dd", "raw", "e01", "iso", "001"];

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MountError {
    #[error("{0}: no such device attached")]
    DeviceNotAttached(String),

    #[error("{device} is already mounted on {mount_point}")]
    AlreadyMounted { device: String, mount_point: String },

    #[error("{0}: not mounted")]
    NotMounted(String),

    #[error("mount point {0} is not a directory")]
    NotADirectory(String),
}

/// What a successful mount did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountOutcome {
    Mounted { device: String, mount_point: String },
    /// Same device, same mount point: nothing to do
    AlreadyMounted { device: String, mount_point: String },
}

impl MountOutcome {
    pub fn message(&self) -> String {
        match self {
            MountOutcome::Mounted { device, mount_point } => {
                format!("mounted /dev/{} on {}", device, mount_point)
            }
            MountOutcome::AlreadyMounted { device, mount_point } => {
                format!("mount: /dev/{} already mounted on {}", device, mount_point)
            }
        }
    }
}

/// Devices attached to one session, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceTable {
    devices: Vec<Device>,
}

impl DeviceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace by name. A replaced device keeps its mount state and
    /// moves to the most-recently-attached position.
    pub fn attach(&mut self, mut device: Device) {
        if let Some(pos) = self.devices.iter().position(|d| d.name == device.name) {
            let previous = self.devices.remove(pos);
            device.mounted = previous.mounted;
            device.mount_point = previous.mount_point;
        }
        self.devices.push(device);
    }

    pub fn get(&self, name: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.name == name)
    }

    pub fn list(&self) -> &[Device] {
        &self.devices
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn most_recent(&self) -> Option<&Device> {
        self.devices.last()
    }

    pub fn mounted(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter().filter(|d| d.mounted)
    }

    pub fn mounted_at(&self, mount_point: &str) -> Option<&Device> {
        self.devices
            .iter()
            .find(|d| d.mounted && d.mount_point.as_deref() == Some(mount_point))
    }

    /// Find the device a `mount` source argument refers to
    pub fn resolve(&self, device_path: &str) -> Option<&Device> {
        if let Some(name) = device_path.strip_prefix("/dev/") {
            return self.get(name);
        }
        if is_image_path(device_path) {
            return self.most_recent();
        }
        self.get(device_path)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut Device> {
        self.devices.iter_mut().find(|d| d.name == name)
    }
}

fn is_image_path(path: &str) -> bool {
    path.rsplit_once('.')
        .map(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Graft a device's content at `mount_point` (canonical) and mark it mounted
pub fn mount(
    vfs: &mut Vfs,
    devices: &mut DeviceTable,
    device_path: &str,
    mount_point: &str,
) -> Result<MountOutcome, MountError> {
    let device = devices
        .resolve(device_path)
        .ok_or_else(|| MountError::DeviceNotAttached(device_path.to_string()))?
        .clone();

    if device.mounted {
        let current = device.mount_point.clone().unwrap_or_default();
        return if current == mount_point {
            Ok(MountOutcome::AlreadyMounted { device: device.name, mount_point: current })
        } else {
            Err(MountError::AlreadyMounted { device: device.name, mount_point: current })
        };
    }

    vfs.create_dir_all(mount_point)
        .map_err(|_| MountError::NotADirectory(mount_point.to_string()))?;

    for (segment, entry) in &device.content {
        let target = join(mount_point, segment);
        if target == mount_point || !is_within(&target, mount_point) {
            log::warn!("skipping device entry {} on {}: outside {}", segment, device.name, mount_point);
            continue;
        }
        if let Some((parent, _)) = split_parent(&target) {
            if vfs.create_dir_all(&parent).is_err() {
                log::warn!("skipping device entry {} on {}: parent is a file", segment, device.name);
                continue;
            }
        }
        if let Err(FsError::NotADirectory) = vfs.insert(&target, entry.to_node()) {
            log::warn!("skipping device entry {} on {}", segment, device.name);
        }
    }

    if let Some(record) = devices.get_mut(&device.name) {
        record.mounted = true;
        record.mount_point = Some(mount_point.to_string());
    }
    log::info!("mounted {} on {}", device.name, mount_point);

    Ok(MountOutcome::Mounted { device: device.name, mount_point: mount_point.to_string() })
}

/// Clear the mount flag of whatever is mounted at `target`.
///
/// `target` is a canonical mount point or a `/dev/<name>` path. Grafted
/// entries stay in the tree.
pub fn unmount(devices: &mut DeviceTable, target: &str) -> Result<String, MountError> {
    let name = match target.strip_prefix("/dev/") {
        Some(name) => devices.get(name).filter(|d| d.mounted).map(|d| d.name.clone()),
        None => devices.mounted_at(target).map(|d| d.name.clone()),
    }
    .ok_or_else(|| MountError::NotMounted(target.to_string()))?;

    if let Some(record) = devices.get_mut(&name) {
        record.mounted = false;
        record.mount_point = None;
    }
    log::info!("unmounted {} from {}", name, target);
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DeviceEntry, DeviceKind, Node};

    fn usb() -> Device {
        Device::new("sdb1", DeviceKind::Disk)
            .with_entry("report.docx", DeviceEntry::Text("Q3 figures".into()))
            .with_entry(
                "photos",
                DeviceEntry::Node(Node::dir_with([("beach.jpg", Node::file("JFIF"))])),
            )
    }

    #[test]
    fn attach_is_idempotent_and_orders_by_recency() {
        let mut table = DeviceTable::new();
        table.attach(usb());
        table.attach(Device::new("sdc", DeviceKind::Remote));
        table.attach(usb());
        assert_eq!(table.list().len(), 2);
        assert_eq!(table.most_recent().unwrap().name, "sdb1");
    }

    #[test]
    fn mount_grafts_content_and_creates_mount_point() {
        let mut vfs = Vfs::new();
        let mut table = DeviceTable::new();
        table.attach(usb());

        let outcome = mount(&mut vfs, &mut table, "/dev/sdb1", "/mnt/usb").unwrap();
        assert_eq!(
            outcome,
            MountOutcome::Mounted { device: "sdb1".into(), mount_point: "/mnt/usb".into() }
        );
        assert_eq!(vfs.get_node("/mnt/usb/report.docx").unwrap().content(), Some("Q3 figures"));
        assert!(vfs.is_dir("/mnt/usb/photos"));
        assert!(table.get("sdb1").unwrap().mounted);
    }

    #[test]
    fn entries_cannot_escape_the_mount_point() {
        let mut vfs = Vfs::new();
        let mut table = DeviceTable::new();
        table.attach(
            usb()
                .with_entry("../../etc/passwd", DeviceEntry::Text("root::0:0".into()))
                .with_entry(".", DeviceEntry::Text("flat".into())),
        );

        mount(&mut vfs, &mut table, "/dev/sdb1", "/mnt/usb").unwrap();
        assert!(!vfs.exists("/etc/passwd"));
        assert!(vfs.is_dir("/mnt/usb"));
        assert!(vfs.exists("/mnt/usb/report.docx"));
    }

    #[test]
    fn remounting_elsewhere_fails_but_same_point_is_a_no_op() {
        let mut vfs = Vfs::new();
        let mut table = DeviceTable::new();
        table.attach(usb());
        mount(&mut vfs, &mut table, "/dev/sdb1", "/mnt/usb").unwrap();

        let err = mount(&mut vfs, &mut table, "/dev/sdb1", "/mnt/other").unwrap_err();
        assert_eq!(
            err,
            MountError::AlreadyMounted { device: "sdb1".into(), mount_point: "/mnt/usb".into() }
        );
        let again = mount(&mut vfs, &mut table, "/dev/sdb1", "/mnt/usb").unwrap();
        assert!(again.message().contains("already mounted"));
    }

    #[test]
    fn image_paths_fall_back_to_latest_device() {
        let mut vfs = Vfs::new();
        let mut table = DeviceTable::new();
        table.attach(Device::new("sdc", DeviceKind::Disk));
        table.attach(usb());
        let outcome = mount(&mut vfs, &mut table, "/evidence/disk.E01", "/mnt/image").unwrap();
        assert!(matches!(outcome, MountOutcome::Mounted { ref device, .. } if device == "sdb1"));
        assert_eq!(
            mount(&mut vfs, &mut table, "/dev/sdz", "/mnt/z"),
            Err(MountError::DeviceNotAttached("/dev/sdz".into()))
        );
    }

    #[test]
    fn unmount_keeps_grafted_entries() {
        let mut vfs = Vfs::new();
        let mut table = DeviceTable::new();
        table.attach(usb());
        assert_eq!(unmount(&mut table, "/mnt/usb"), Err(MountError::NotMounted("/mnt/usb".into())));

        mount(&mut vfs, &mut table, "/dev/sdb1", "/mnt/usb").unwrap();
        assert_eq!(unmount(&mut table, "/mnt/usb").unwrap(), "sdb1");
        assert!(!table.get("sdb1").unwrap().mounted);
        assert!(vfs.exists("/mnt/usb/report.docx"));

        mount(&mut vfs, &mut table, "/dev/sdb1", "/mnt/usb2").unwrap();
        assert_eq!(unmount(&mut table, "/dev/sdb1").unwrap(), "sdb1");
    }
}
