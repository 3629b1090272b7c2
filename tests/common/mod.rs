//! Object models shared by the scenario tests below. Each mirrors one shape of graph from the
//! collector's own design notes: a bare scalar, a singly-linked list, and a doubly-linked ring.

use linegc::ObjectModel;
use std::mem::size_of;
use std::ptr::addr_of_mut;

#[repr(C)]
pub struct IntObject {
    pub value: i32,
}

pub struct IntModel;

unsafe impl ObjectModel for IntModel {
    unsafe fn size_of(&self, _obj: *mut u8) -> usize {
        size_of::<IntObject>()
    }

    unsafe fn pointer_begin(&self, _obj: *mut u8) -> Option<*mut *mut u8> {
        None
    }

    unsafe fn next_pointer(&self, _obj: *mut u8, _prev: *mut *mut u8) -> Option<*mut *mut u8> {
        None
    }
}

/// A singly-linked list node: `value` plus one outgoing pointer at a fixed offset.
#[repr(C)]
pub struct ListNode {
    pub value: i32,
    pub next: *mut u8,
}

pub struct ListModel;

unsafe impl ObjectModel for ListModel {
    unsafe fn size_of(&self, _obj: *mut u8) -> usize {
        size_of::<ListNode>()
    }

    unsafe fn pointer_begin(&self, obj: *mut u8) -> Option<*mut *mut u8> {
        let node = obj as *mut ListNode;
        Some(addr_of_mut!((*node).next))
    }

    unsafe fn next_pointer(&self, _obj: *mut u8, _prev: *mut *mut u8) -> Option<*mut *mut u8> {
        None
    }
}

/// A doubly-linked ring node.
#[repr(C)]
pub struct RingNode {
    pub value: i32,
    pub next: *mut u8,
    pub prev: *mut u8,
}

pub struct RingModel;

unsafe impl ObjectModel for RingModel {
    unsafe fn size_of(&self, _obj: *mut u8) -> usize {
        size_of::<RingNode>()
    }

    unsafe fn pointer_begin(&self, obj: *mut u8) -> Option<*mut *mut u8> {
        let node = obj as *mut RingNode;
        Some(addr_of_mut!((*node).next))
    }

    unsafe fn next_pointer(&self, obj: *mut u8, prev: *mut *mut u8) -> Option<*mut *mut u8> {
        let node = obj as *mut RingNode;
        let next_slot = addr_of_mut!((*node).next);
        let prev_slot = addr_of_mut!((*node).prev);
        if prev == next_slot {
            Some(prev_slot)
        } else {
            None
        }
    }
}
