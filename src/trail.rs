use std::collections::VecDeque;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Bounded FIFO of recent positions; the oldest point falls off first.
#[derive(Clone, Debug)]
pub struct Trail {
    points: VecDeque<Point>,
    capacity: usize,
}

impl Trail {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn push(&mut self, x: f32, y: f32) {
        self.points.push_back(Point { x, y });
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Point> + '_ {
        self.points.iter()
    }

    pub fn make_contiguous(&mut self) -> &[Point] {
        self.points.make_contiguous()
    }
}
