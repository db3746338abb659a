//! Chunked typed arena that hands out stable handles.
//!
//! The red black tree stores its nodes here and links them by `Handle` instead of by pointer,
//! so parent links never take part in ownership.

use crate::error::Result;
use log::debug;
use std::mem;
use std::ops::{Index, IndexMut};
use std::vec::Vec;

/// A stable reference to a value stored in a `TypedArena<T>`.
///
/// A handle stays valid until the value it refers to is freed. Afterwards the slot may be
/// reused by a later allocation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Handle {
    chunk_index: usize,
    block_index: usize,
}

enum Block<T> {
    Occupied(T),
    Vacant(Option<Handle>),
}

/// An allocator for a single type of object.
///
/// Objects are stored in chunks of `chunk_size` blocks. A chunk is never reallocated once it is
/// created, and freed blocks are threaded onto a free list that is consumed before a new chunk
/// is appended. Dropping the arena drops every live object exactly once.
///
/// # Examples
///
/// ```
/// use ordered_index::arena::TypedArena;
///
/// let mut arena = TypedArena::new(1024);
///
/// let x = arena.allocate(1);
/// assert_eq!(arena[x], 1);
///
/// arena[x] += 1;
/// assert_eq!(arena[x], 2);
///
/// assert_eq!(arena.free(&x), 2);
/// assert!(arena.is_empty());
/// ```
pub struct TypedArena<T> {
    head: Option<Handle>,
    chunks: Vec<Vec<Block<T>>>,
    chunk_size: usize,
    size: usize,
    capacity: usize,
}

impl<T> TypedArena<T> {
    fn is_valid_handle(&self, handle: &Handle) -> bool {
        handle.chunk_index < self.chunks.len()
            && handle.block_index < self.chunks[handle.chunk_index].len()
    }

    /// Constructs a new, empty `TypedArena<T>` with a specific number of objects per chunk.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::arena::TypedArena;
    ///
    /// let arena: TypedArena<u32> = TypedArena::new(1024);
    /// assert_eq!(arena.capacity(), 0);
    /// ```
    pub fn new(chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "Error: chunk size must be positive.");
        TypedArena {
            head: None,
            chunks: Vec::new(),
            chunk_size,
            size: 0,
            capacity: 0,
        }
    }

    fn place(&mut self, value: T) -> Handle {
        self.size += 1;
        match self.head.take() {
            None => {
                let chunk_index = self.chunks.len() - 1;
                let last_chunk = &mut self.chunks[chunk_index];
                last_chunk.push(Block::Occupied(value));
                Handle {
                    chunk_index,
                    block_index: last_chunk.len() - 1,
                }
            },
            Some(handle) => {
                let vacant_block = mem::replace(
                    &mut self.chunks[handle.chunk_index][handle.block_index],
                    Block::Occupied(value),
                );
                match vacant_block {
                    Block::Vacant(next_handle) => self.head = next_handle,
                    Block::Occupied(_) => panic!("Error: free list points at an occupied block."),
                }
                handle
            },
        }
    }

    /// Allocates an object in the arena and returns its handle.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::arena::TypedArena;
    ///
    /// let mut arena = TypedArena::new(1024);
    /// let x = arena.allocate(0);
    /// assert_eq!(arena.get(&x), Some(&0));
    /// ```
    pub fn allocate(&mut self, value: T) -> Handle {
        if self.size == self.capacity {
            debug!("arena growing to {} chunks", self.chunks.len() + 1);
            self.chunks.push(Vec::with_capacity(self.chunk_size));
            self.capacity += self.chunk_size;
        }
        self.place(value)
    }

    /// Allocates an object in the arena, returning an error instead of aborting if a new chunk
    /// cannot be reserved. The arena is unchanged on failure and `value` is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::arena::TypedArena;
    ///
    /// let mut arena = TypedArena::new(16);
    /// let x = arena.try_allocate(7).unwrap();
    /// assert_eq!(arena[x], 7);
    /// ```
    pub fn try_allocate(&mut self, value: T) -> Result<Handle> {
        if self.size == self.capacity {
            debug!("arena growing to {} chunks", self.chunks.len() + 1);
            let mut chunk = Vec::new();
            chunk.try_reserve_exact(self.chunk_size)?;
            self.chunks.try_reserve(1)?;
            self.chunks.push(chunk);
            self.capacity += self.chunk_size;
        }
        Ok(self.place(value))
    }

    /// Deallocates an object in the arena and returns it.
    ///
    /// # Panics
    ///
    /// Panics if the handle corresponds to an invalid or vacant block.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::arena::TypedArena;
    ///
    /// let mut arena = TypedArena::new(1024);
    /// let x = arena.allocate(0);
    /// assert_eq!(arena.free(&x), 0);
    /// ```
    pub fn free(&mut self, handle: &Handle) -> T {
        if !self.is_valid_handle(handle) {
            panic!("Error: attempting to free invalid block.");
        }
        let old_block = mem::replace(
            &mut self.chunks[handle.chunk_index][handle.block_index],
            Block::Vacant(self.head),
        );
        match old_block {
            Block::Vacant(next_handle) => {
                self.chunks[handle.chunk_index][handle.block_index] = Block::Vacant(next_handle);
                panic!("Error: attempting to free vacant block.");
            },
            Block::Occupied(value) => {
                self.size -= 1;
                self.head = Some(*handle);
                value
            },
        }
    }

    /// Returns an immutable reference to an object in the arena. Returns `None` if the handle
    /// does not correspond to a live object.
    pub fn get(&self, handle: &Handle) -> Option<&T> {
        if !self.is_valid_handle(handle) {
            return None;
        }
        match self.chunks[handle.chunk_index][handle.block_index] {
            Block::Occupied(ref value) => Some(value),
            Block::Vacant(_) => None,
        }
    }

    /// Returns a mutable reference to an object in the arena. Returns `None` if the handle does
    /// not correspond to a live object.
    pub fn get_mut(&mut self, handle: &Handle) -> Option<&mut T> {
        if !self.is_valid_handle(handle) {
            return None;
        }
        match self.chunks[handle.chunk_index][handle.block_index] {
            Block::Occupied(ref mut value) => Some(value),
            Block::Vacant(_) => None,
        }
    }

    /// Returns the number of live objects in the arena.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the arena holds no live objects.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the number of blocks reserved across all chunks.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every object and releases all chunks. Handles from before the call are
    /// invalidated.
    pub fn clear(&mut self) {
        self.head = None;
        self.chunks.clear();
        self.size = 0;
        self.capacity = 0;
    }
}

impl<T> Index<Handle> for TypedArena<T> {
    type Output = T;

    fn index(&self, handle: Handle) -> &Self::Output {
        self.get(&handle).expect("Error: handle out of bounds.")
    }
}

impl<T> IndexMut<Handle> for TypedArena<T> {
    fn index_mut(&mut self, handle: Handle) -> &mut Self::Output {
        self.get_mut(&handle).expect("Error: handle out of bounds.")
    }
}
