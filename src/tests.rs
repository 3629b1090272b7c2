//! Shared object models used across this crate's unit tests, kept in one place so every module's
//! `#[cfg(test)]` block can exercise a real `Gc<M>` without redefining a toy object model.

pub(crate) mod support {
    use crate::object_model::ObjectModel;
    use std::mem::size_of;

    /// A single untyped scalar payload, with a `tag` byte reserved for list-node tests.
    #[repr(C)]
    pub(crate) struct IntObject {
        pub(crate) tag: u8,
        pub(crate) value: i32,
    }

    /// Object model for [`IntObject`]: fixed size, no outgoing pointers.
    pub(crate) struct IntModel;

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
    pub(crate) struct ListNode {
        pub(crate) value: i32,
        pub(crate) next: *mut u8,
    }

    pub(crate) struct ListModel;

    unsafe impl ObjectModel for ListModel {
        unsafe fn size_of(&self, _obj: *mut u8) -> usize {
            size_of::<ListNode>()
        }

        unsafe fn pointer_begin(&self, obj: *mut u8) -> Option<*mut *mut u8> {
            let node = obj as *mut ListNode;
            Some(std::ptr::addr_of_mut!((*node).next))
        }

        unsafe fn next_pointer(&self, _obj: *mut u8, _prev: *mut *mut u8) -> Option<*mut *mut u8> {
            None
        }
    }

    /// A doubly-linked ring node: two outgoing pointers, `next` then `prev`.
    #[repr(C)]
    pub(crate) struct RingNode {
        pub(crate) value: i32,
        pub(crate) next: *mut u8,
        pub(crate) prev: *mut u8,
    }

    pub(crate) struct RingModel;

    unsafe impl ObjectModel for RingModel {
        unsafe fn size_of(&self, _obj: *mut u8) -> usize {
            size_of::<RingNode>()
        }

        unsafe fn pointer_begin(&self, obj: *mut u8) -> Option<*mut *mut u8> {
            let node = obj as *mut RingNode;
            Some(std::ptr::addr_of_mut!((*node).next))
        }

        unsafe fn next_pointer(&self, obj: *mut u8, prev: *mut *mut u8) -> Option<*mut *mut u8> {
            let node = obj as *mut RingNode;
            let next_slot = std::ptr::addr_of_mut!((*node).next);
            let prev_slot = std::ptr::addr_of_mut!((*node).prev);
            if prev == next_slot {
                Some(prev_slot)
            } else {
                None
            }
        }
    }
}
