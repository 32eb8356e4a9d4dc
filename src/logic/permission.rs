//! Permission Gate
//!
//! The core never asks for permissions, it only reads the current state.
//! Both the read and the receive permission must be granted for either the
//! query path or the live stream to work.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    ReadSms,
    ReceiveSms,
}

/// Read-only view of the platform permission state
pub trait PermissionGate: Send + Sync {
    fn is_granted(&self, permission: Permission) -> bool;

    /// Both SMS permissions held
    fn sms_permitted(&self) -> bool {
        self.is_granted(Permission::ReadSms) && self.is_granted(Permission::ReceiveSms)
    }
}

/// Permission state held in memory, switchable at runtime
#[derive(Debug)]
pub struct StaticPermissions {
    read_sms: AtomicBool,
    receive_sms: AtomicBool,
}

impl StaticPermissions {
    pub fn new(read_sms: bool, receive_sms: bool) -> Self {
        Self {
            read_sms: AtomicBool::new(read_sms),
            receive_sms: AtomicBool::new(receive_sms),
        }
    }

    pub fn granted() -> Self {
        Self::new(true, true)
    }

    pub fn denied() -> Self {
        Self::new(false, false)
    }

    pub fn set(&self, permission: Permission, granted: bool) {
        match permission {
            Permission::ReadSms => self.read_sms.store(granted, Ordering::SeqCst),
            Permission::ReceiveSms => self.receive_sms.store(granted, Ordering::SeqCst),
        }
    }
}

impl PermissionGate for StaticPermissions {
    fn is_granted(&self, permission: Permission) -> bool {
        match permission {
            Permission::ReadSms => self.read_sms.load(Ordering::SeqCst),
            Permission::ReceiveSms => self.receive_sms.load(Ordering::SeqCst),
        }
    }
}
