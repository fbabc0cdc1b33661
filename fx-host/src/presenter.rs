//! # Presenter 模块
//!
//! 把表面内容输出到终端。
//!
//! 呈现器与引擎在同一节拍上运行，但互不依赖：引擎只写表面，
//! 呈现器只读表面，并通过修订号跳过没有变化的帧。
//!
//! 关闭 ANSI 时输出纯文本（用于测试和非终端输出）：
//! 不可见的行输出为空行，高亮列用 `[ ]` 包围。

use std::io::{self, Write};

use ansi_term::{Colour, Style};

use crate::app::Scene;
use crate::surface::{CanvasSurface, TextLine};

/// 解析颜色名或 `#rrggbb`
pub fn parse_color(name: &str) -> Option<Colour> {
    match name.trim().to_lowercase().as_str() {
        "black" => Some(Colour::Black),
        "red" => Some(Colour::Red),
        "green" => Some(Colour::Green),
        "yellow" => Some(Colour::Yellow),
        "blue" => Some(Colour::Blue),
        "magenta" | "purple" => Some(Colour::Purple),
        "cyan" => Some(Colour::Cyan),
        "white" => Some(Colour::White),
        "gray" | "grey" => Some(Colour::Fixed(8)),
        hex if hex.starts_with('#') && hex.len() == 7 => {
            let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
            Some(Colour::RGB(channel(1..3)?, channel(3..5)?, channel(5..7)?))
        }
        _ => None,
    }
}

/// 终端呈现器
#[derive(Debug)]
pub struct Presenter<W: Write> {
    out: W,
    colour: Option<Colour>,
    ansi: bool,
    /// 上一次输出的行数（ANSI 模式下用于回退光标）
    drawn_lines: usize,
    last_revision: Option<(u64, u64)>,
}

impl Presenter<io::Stdout> {
    /// 输出到标准输出
    pub fn stdout(colour: Option<Colour>) -> Self {
        Self::new(io::stdout(), colour, true)
    }
}

impl<W: Write> Presenter<W> {
    pub fn new(out: W, colour: Option<Colour>, ansi: bool) -> Self {
        Self {
            out,
            colour,
            ansi,
            drawn_lines: 0,
            last_revision: None,
        }
    }

    /// 纯文本呈现器
    pub fn plain(out: W) -> Self {
        Self::new(out, None, false)
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// 绘制场景；修订号未变化时跳过
    pub fn draw(&mut self, scene: &Scene) -> io::Result<()> {
        let revision = scene.revision();
        if self.last_revision == Some(revision) {
            return Ok(());
        }
        self.last_revision = Some(revision);

        let lines = self.render(scene);
        if self.ansi && self.drawn_lines > 0 {
            write!(self.out, "\x1b[{}A", self.drawn_lines)?;
        }
        for line in &lines {
            if self.ansi {
                write!(self.out, "\r\x1b[2K")?;
            }
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()?;

        self.drawn_lines = lines.len();
        Ok(())
    }

    /// 渲染场景为输出行
    ///
    /// 画布被写过才输出画布行，文本行总在最后。
    pub fn render(&self, scene: &Scene) -> Vec<String> {
        let mut lines = Vec::new();
        if scene.canvas.revision() > 0 {
            lines.extend(self.render_canvas(&scene.canvas));
        }
        lines.push(self.render_text(&scene.text.snapshot()));
        lines
    }

    fn base_style(&self, brightness: f64) -> Style {
        let mut style = match self.colour {
            Some(colour) => Style::new().fg(colour),
            None => Style::new(),
        };
        if brightness < 0.5 {
            style = style.dimmed();
        } else if brightness >= 0.95 {
            style = style.bold();
        }
        style
    }

    /// 渲染文本行
    pub fn render_text(&self, line: &TextLine) -> String {
        if !line.visible || line.brightness <= 0.0 {
            return String::new();
        }

        if !self.ansi {
            return line
                .text
                .chars()
                .enumerate()
                .map(|(column, ch)| {
                    if line.highlight == Some(column) {
                        format!("[{ch}]")
                    } else {
                        ch.to_string()
                    }
                })
                .collect();
        }

        let style = self.base_style(line.brightness);
        line.text
            .chars()
            .enumerate()
            .map(|(column, ch)| {
                let style = if line.highlight == Some(column) {
                    style.reverse()
                } else {
                    style
                };
                style.paint(ch.to_string()).to_string()
            })
            .collect()
    }

    /// 渲染画布
    pub fn render_canvas(&self, canvas: &CanvasSurface) -> Vec<String> {
        if !self.ansi {
            return canvas.rows();
        }

        canvas
            .snapshot()
            .into_iter()
            .map(|row| {
                row.iter()
                    .map(|cell| {
                        if cell.is_blank() {
                            " ".to_string()
                        } else if cell.brightness >= 0.95 {
                            Colour::White.bold().paint(cell.ch.to_string()).to_string()
                        } else {
                            self.base_style(cell.brightness)
                                .paint(cell.ch.to_string())
                                .to_string()
                        }
                    })
                    .collect()
            })
            .collect()
    }
}
