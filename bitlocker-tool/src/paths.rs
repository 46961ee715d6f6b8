//! 系统程序的默认位置

use std::env;
use std::path::PathBuf;

pub const DISKPART: &str = "diskpart.exe";
pub const BDEUNLOCK: &str = "bdeunlock.exe";
pub const MANAGE_BDE: &str = "manage-bde.exe";

/// `<SystemRoot>\System32`
pub fn system32() -> PathBuf {
    let root = env::var_os("SystemRoot")
        .or_else(|| env::var_os("windir"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(r"C:\Windows"));

    root.join("System32")
}
