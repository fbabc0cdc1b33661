//! # Surface 模块
//!
//! 效果渲染的目标表面。
//!
//! 表面由调用方创建并通过 [`Target`](fx_runtime::Target) 交给动画；
//! 效果在帧任务中写入，呈现器在自己的节拍上读取。
//! 每次内容发生变化时递增修订号，呈现器据此跳过未变化的帧。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 单行文本的渲染状态
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    /// 当前显示的文本
    pub text: String,
    /// 是否可见
    pub visible: bool,
    /// 亮度（0.0 - 1.0）
    pub brightness: f64,
    /// 高亮列（按字符计）
    pub highlight: Option<usize>,
}

impl TextLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            visible: true,
            brightness: 1.0,
            highlight: None,
        }
    }
}

/// 文本行表面
#[derive(Debug)]
pub struct TextSurface {
    line: Mutex<TextLine>,
    revision: AtomicU64,
}

impl TextSurface {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            line: Mutex::new(TextLine::new(text)),
            revision: AtomicU64::new(0),
        }
    }

    /// 当前状态的副本
    pub fn snapshot(&self) -> TextLine {
        lock(&self.line).clone()
    }

    /// 当前文本
    pub fn text(&self) -> String {
        lock(&self.line).text.clone()
    }

    /// 修订号
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    /// 修改状态；内容确有变化时递增修订号
    pub fn edit(&self, f: impl FnOnce(&mut TextLine)) {
        let mut line = lock(&self.line);
        let before = line.clone();
        f(&mut *line);
        if *line != before {
            self.revision.fetch_add(1, Ordering::AcqRel);
        }
    }
}

/// 画布单元格
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub brightness: f64,
}

impl Cell {
    /// 空白单元格
    pub const BLANK: Cell = Cell {
        ch: ' ',
        brightness: 0.0,
    };

    pub fn new(ch: char, brightness: f64) -> Self {
        Self { ch, brightness }
    }

    pub fn is_blank(&self) -> bool {
        self.ch == ' ' || self.brightness <= 0.0
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::BLANK
    }
}

/// 画布单元格的可变视图
#[derive(Debug)]
pub struct CanvasCells<'a> {
    width: usize,
    height: usize,
    cells: &'a mut [Cell],
}

impl CanvasCells<'_> {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        if x < self.width && y < self.height {
            Some(self.cells[y * self.width + x])
        } else {
            None
        }
    }

    /// 写入单元格，越界时忽略
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    /// 所有单元格亮度乘以 `factor`，低于 `floor` 的清空
    pub fn fade(&mut self, factor: f64, floor: f64) {
        for cell in self.cells.iter_mut() {
            cell.brightness *= factor;
            if cell.brightness < floor {
                *cell = Cell::BLANK;
            }
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }
}

/// 字符画布表面
#[derive(Debug)]
pub struct CanvasSurface {
    width: usize,
    height: usize,
    cells: Mutex<Vec<Cell>>,
    revision: AtomicU64,
}

impl CanvasSurface {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: Mutex::new(vec![Cell::BLANK; width * height]),
            revision: AtomicU64::new(0),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// 修订号
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        if x < self.width && y < self.height {
            Some(lock(&self.cells)[y * self.width + x])
        } else {
            None
        }
    }

    /// 修改单元格；内容确有变化时递增修订号
    pub fn edit(&self, f: impl FnOnce(&mut CanvasCells<'_>)) {
        let mut cells = lock(&self.cells);
        let before = cells.clone();
        f(&mut CanvasCells {
            width: self.width,
            height: self.height,
            cells: cells.as_mut_slice(),
        });
        if *cells != before {
            self.revision.fetch_add(1, Ordering::AcqRel);
        }
    }

    /// 所有单元格是否为空
    pub fn is_blank(&self) -> bool {
        lock(&self.cells).iter().all(Cell::is_blank)
    }

    /// 单元格副本，按行排列
    pub fn snapshot(&self) -> Vec<Vec<Cell>> {
        lock(&self.cells)
            .chunks(self.width.max(1))
            .map(<[Cell]>::to_vec)
            .collect()
    }

    /// 纯文本行（空白单元格显示为空格）
    pub fn rows(&self) -> Vec<String> {
        self.snapshot()
            .into_iter()
            .map(|row| {
                row.iter()
                    .map(|cell| if cell.is_blank() { ' ' } else { cell.ch })
                    .collect()
            })
            .collect()
    }
}
