use crate::output::OutputFormat;
use crate::print::Printer;
use tabled::builder::Builder;
use tabled::settings::object::Rows;
use tabled::settings::{Format, Modify, Panel, Style, Width};

#[derive(Debug, Clone, PartialEq)]
enum Row {
    Data(Vec<String>),
    Separator,
}

/// Human-readable table for the default and pretty output formats.
#[derive(Debug, Clone, Default)]
pub struct Table {
    title: Option<String>,
    header: Vec<String>,
    rows: Vec<Row>,
    auto_merge: Vec<usize>,
}

/// Terminal-dependent rendering knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Bold and underline the header row.
    pub style_header: bool,
    /// Truncate the rendered table to this many columns.
    pub max_width: Option<usize>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn set_header<I, S>(&mut self, columns: I)
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.header = columns.into_iter().map(|c| c.to_string()).collect();
    }

    pub fn add_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.rows
            .push(Row::Data(cells.into_iter().map(|c| c.to_string()).collect()));
    }

    pub fn add_separator(&mut self) {
        self.rows.push(Row::Separator);
    }

    /// Consecutive equal cells in these columns are shown once.
    pub fn enable_auto_merge_on_columns(&mut self, columns: &[usize]) {
        self.auto_merge = columns.to_vec();
    }

    pub fn is_empty(&self) -> bool {
        !self.rows.iter().any(|r| matches!(r, Row::Data(_)))
    }

    pub fn render(&self) -> String {
        self.render_with(RenderOptions::default())
    }

    pub fn render_with(&self, opts: RenderOptions) -> String {
        let columns = self.column_count();
        if columns == 0 {
            return self.title.clone().unwrap_or_default();
        }

        let body = self.merged_rows(columns);
        let widths = self.column_widths(columns, &body);

        let mut builder = Builder::default();
        if !self.header.is_empty() {
            builder.push_record(pad(&self.header, columns));
        }
        for row in &body {
            match row {
                Row::Data(cells) => builder.push_record(cells.clone()),
                Row::Separator => builder.push_record(widths.iter().map(|w| "─".repeat(*w))),
            }
        }

        let mut table = builder.build();
        table.with(Style::blank());
        if opts.style_header && !self.header.is_empty() {
            table.with(
                Modify::new(Rows::first())
                    .with(Format::content(|s| {
                        console::style(s)
                            .bold()
                            .underlined()
                            .force_styling(true)
                            .to_string()
                    })),
            );
        }
        if let Some(title) = &self.title {
            table.with(Panel::header(title.clone()));
        }
        if let Some(max) = opts.max_width {
            table.with(Width::truncate(max).suffix("…"));
        }
        table.to_string()
    }

    /// Renders for stdout: fitted to the terminal when there is one, with a
    /// styled header only for `pretty` output.
    pub fn render_for(&self, p: &Printer, format: OutputFormat) -> String {
        self.render_with(terminal_options(p, format))
    }

    pub fn display(&self, p: &Printer, format: OutputFormat) {
        p.outputln(&self.render_for(p, format));
    }

    fn column_count(&self) -> usize {
        self.rows
            .iter()
            .filter_map(|r| match r {
                Row::Data(cells) => Some(cells.len()),
                Row::Separator => None,
            })
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0)
    }

    fn merged_rows(&self, columns: usize) -> Vec<Row> {
        let mut previous: Option<Vec<String>> = None;
        let mut out = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            match row {
                Row::Separator => {
                    previous = None;
                    out.push(Row::Separator);
                }
                Row::Data(cells) => {
                    let cells = pad(cells, columns);
                    let mut shown = cells.clone();
                    if let Some(prev) = &previous {
                        for &col in &self.auto_merge {
                            if col < columns && prev[col] == cells[col] {
                                shown[col] = String::new();
                            }
                        }
                    }
                    previous = Some(cells);
                    out.push(Row::Data(shown));
                }
            }
        }
        out
    }

    fn column_widths(&self, columns: usize, body: &[Row]) -> Vec<usize> {
        let mut widths = vec![0; columns];
        let header = pad(&self.header, columns);
        let data = body.iter().filter_map(|r| match r {
            Row::Data(cells) => Some(cells),
            Row::Separator => None,
        });
        for cells in std::iter::once(&header).chain(data) {
            for (i, cell) in cells.iter().enumerate() {
                let w = cell.lines().map(|l| l.chars().count()).max().unwrap_or(0);
                widths[i] = widths[i].max(w);
            }
        }
        widths
    }
}

fn terminal_options(p: &Printer, format: OutputFormat) -> RenderOptions {
    let width = || {
        console::Term::stdout()
            .size_checked()
            .map(|(_, cols)| cols as usize)
    };
    options_for(format, p.stdout_is_terminal(), width)
}

/// Styling and width limits apply to terminals only; styling needs `pretty`.
fn options_for(
    format: OutputFormat,
    is_terminal: bool,
    width: impl FnOnce() -> Option<usize>,
) -> RenderOptions {
    if !is_terminal {
        return RenderOptions::default();
    }
    RenderOptions {
        style_header: format == OutputFormat::Pretty,
        max_width: width(),
    }
}

fn pad(cells: &[String], columns: usize) -> Vec<String> {
    let mut out = cells.to_vec();
    out.resize(columns, String::new());
    out
}
