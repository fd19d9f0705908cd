// Wed Oct 14 2026 - Alex

pub mod bytecode;
pub mod callbacks;
pub mod constant_pool;
pub mod context;
pub mod error;
pub mod flags;
pub mod local_variables;
pub mod ram;
pub mod rom;

pub use callbacks::{ClassKind, ClassOwner, ClassWalkCallbacks, SlotType};
pub use context::{add_object_as_slots, Emitter, WalkContext};
pub use error::{FieldFault, SkipUnreadable, WalkError};
pub use ram::RamClassWalker;
pub use rom::RomClassWalker;

use crate::memory::Address;

/// A walker for one class structure in the image.
pub enum ClassWalker {
    Rom(RomClassWalker),
    Ram(RamClassWalker),
}

impl ClassWalker {
    pub fn rom(cx: WalkContext, address: Address) -> Self {
        ClassWalker::Rom(RomClassWalker::new(cx, address))
    }

    pub fn ram(cx: WalkContext, address: Address) -> Self {
        ClassWalker::Ram(RamClassWalker::new(cx, address))
    }

    pub fn kind(&self) -> ClassKind {
        match self {
            ClassWalker::Rom(_) => ClassKind::Rom,
            ClassWalker::Ram(_) => ClassKind::Ram,
        }
    }

    pub fn address(&self) -> Address {
        match self {
            ClassWalker::Rom(walker) => walker.address(),
            ClassWalker::Ram(walker) => walker.address(),
        }
    }

    pub fn owner(&self) -> Result<ClassOwner, WalkError> {
        match self {
            ClassWalker::Rom(walker) => walker.owner(),
            ClassWalker::Ram(walker) => walker.owner(),
        }
    }

    pub fn class_name(&self) -> Result<String, WalkError> {
        match self {
            ClassWalker::Rom(walker) => walker.class_name(),
            ClassWalker::Ram(walker) => walker.class_name(),
        }
    }

    /// Reports every slot and section of the class to `callbacks`, in walk order.
    pub fn all_slots_in_object_do(&self, callbacks: &mut dyn ClassWalkCallbacks) -> Result<(), WalkError> {
        match self {
            ClassWalker::Rom(walker) => walker.all_slots_in_object_do(callbacks),
            ClassWalker::Ram(walker) => walker.all_slots_in_object_do(callbacks),
        }
    }
}
