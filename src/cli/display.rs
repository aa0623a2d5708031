use crate::list::Page;

use super::ui::truncate;

/// Widest a single column may grow before values are truncated
const MAX_COLUMN_WIDTH: usize = 32;

/// A plain left-aligned table, two spaces between columns
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                self.rows
                    .iter()
                    .filter_map(|r| r.get(i))
                    .map(|c| c.chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
                    .min(MAX_COLUMN_WIDTH)
            })
            .collect()
    }

    pub fn render(&self) -> String {
        let widths = self.widths();
        let line = |cells: Vec<String>| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(c, &w)| format!("{:<w$}", truncate(c, w), w = w))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut out = line(self.headers.iter().map(|h| h.to_string()).collect());
        out.push('\n');
        for row in &self.rows {
            out.push_str(&line(row.clone()));
            out.push('\n');
        }
        out
    }

    pub fn print(&self) {
        print!("{}", self.render());
    }
}

/// Footer under a list page, e.g. `11-20 of 42  page 2/5`
pub fn page_footer<T>(page: &Page<'_, T>) -> String {
    if page.total_items == 0 {
        return "No results.".to_string();
    }
    if page.is_out_of_range() {
        return format!(
            "Page {} is past the end ({} page{}).",
            page.number,
            page.total_pages,
            if page.total_pages == 1 { "" } else { "s" }
        );
    }
    format!(
        "{}-{} of {}  page {}/{}",
        page.first_index(),
        page.last_index(),
        page.total_items,
        page.number,
        page.total_pages
    )
}

/// Print `label: value` when the value is non-empty
pub fn detail(label: &str, value: &str) {
    if !value.trim().is_empty() {
        println!("  {:<16}{}", format!("{}:", label), value);
    }
}

pub fn optional_detail(label: &str, value: Option<&str>) {
    if let Some(v) = value {
        detail(label, v);
    }
}

pub fn money(amount: f64) -> String {
    format!("{:.2}", amount)
}
