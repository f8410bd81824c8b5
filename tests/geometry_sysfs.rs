use std::fs;

use fbframe::error::Error;
use fbframe::render::geometry::resolve_from_sysfs;
use tempfile::tempdir;

fn write_attrs(dir: &std::path::Path, size: &str, bpp: &str, stride: &str) {
    fs::write(dir.join("virtual_size"), size).unwrap();
    fs::write(dir.join("bits_per_pixel"), bpp).unwrap();
    fs::write(dir.join("stride"), stride).unwrap();
}

#[test]
fn resolves_from_raw_attribute_files() {
    let tmp = tempdir().unwrap();
    write_attrs(tmp.path(), "1920,1080\n", "32\n", "7680\n");

    let geometry = resolve_from_sysfs(tmp.path()).unwrap();
    assert_eq!(geometry.width, 1920);
    assert_eq!(geometry.height, 1080);
    assert_eq!(geometry.bits_per_pixel, 32);
    assert_eq!(geometry.stride, 7680);
    assert_eq!(geometry.buffer_len(), 7680 * 1080);
}

#[test]
fn sixteen_bit_depth_is_accepted() {
    let tmp = tempdir().unwrap();
    write_attrs(tmp.path(), "800,480", "16", "1600");

    let geometry = resolve_from_sysfs(tmp.path()).unwrap();
    assert_eq!(geometry.bytes_per_pixel(), 2);
}

#[test]
fn odd_depth_fails_with_unsupported_depth() {
    let tmp = tempdir().unwrap();
    write_attrs(tmp.path(), "800,480", "24", "2400");

    assert!(matches!(
        resolve_from_sysfs(tmp.path()),
        Err(Error::UnsupportedDepth(24))
    ));
}

#[test]
fn missing_attributes_are_device_unavailable() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("virtual_size"), "800,480").unwrap();
    // bits_per_pixel and stride absent

    assert!(matches!(
        resolve_from_sysfs(tmp.path()),
        Err(Error::DeviceUnavailable(_))
    ));
}

#[test]
fn malformed_virtual_size_is_device_unavailable() {
    let tmp = tempdir().unwrap();
    write_attrs(tmp.path(), "not-a-size", "32", "7680");

    assert!(matches!(
        resolve_from_sysfs(tmp.path()),
        Err(Error::DeviceUnavailable(_))
    ));
}
