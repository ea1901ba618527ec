//! Table layout for the LaTeX translator.
//!
//! Tables are typeset as `longtable`. Column widths come from the `colspec`
//! character widths with the legacy formula `0.93 * (colwidth + 1) / 80 +
//! 0.005` (scaled down when the table is wider than 80 characters), so a
//! table never claims the full line width. Tables marked `colwidths-auto`,
//! or lacking widths, use `l` columns instead.

use crate::nodes::{NodeRef, Tag};
use crate::settings::TableStyle;

/// Assumed characters per line.
const LINE_WIDTH: f64 = 80.0;
/// Share of the line a full-width table may use.
const WIDTH_FACTOR: f64 = 0.93;

/// Relative widths (fractions of `\DUtablewidth`) for character widths.
pub fn legacy_widths(colwidths: &[u32]) -> Vec<f64> {
    let total: f64 = colwidths.iter().map(|&w| f64::from(w) + 1.0).sum();
    let mut factor = WIDTH_FACTOR;
    if total > LINE_WIDTH {
        factor *= LINE_WIDTH / total;
    }
    colwidths
        .iter()
        .map(|&w| factor * (f64::from(w) + 1.0) / LINE_WIDTH + 0.005)
        .collect()
}

/// State of the table being translated.
#[derive(Debug, Clone)]
pub(super) struct Table {
    pub style: TableStyle,
    /// `l` columns instead of fixed-width paragraph columns.
    pub auto: bool,
    pub widths: Vec<f64>,
    pub caption: Option<String>,
    align: Option<&'static str>,
    /// Index of the next cell in the current row.
    pub column: usize,
    pub in_head: bool,
}

impl Table {
    pub fn new(node: NodeRef<'_>, default_style: TableStyle) -> Self {
        let style = if node.has_class("borderless") {
            TableStyle::Borderless
        } else if node.has_class("booktabs") {
            TableStyle::Booktabs
        } else {
            default_style
        };
        let align = match node.get_attr("align") {
            Some("left") => Some("l"),
            Some("center") => Some("c"),
            Some("right") => Some("r"),
            _ => None,
        };
        Self {
            style,
            auto: node.has_class("colwidths-auto"),
            widths: Vec::new(),
            caption: None,
            align,
            column: 0,
            in_head: false,
        }
    }

    /// Take the column count and widths from a `tgroup`.
    pub fn set_columns(&mut self, tgroup: NodeRef<'_>) {
        let colwidths: Option<Vec<u32>> = tgroup
            .children()
            .filter(|c| c.tag() == &Tag::Colspec)
            .map(|c| c.attrs().get_u32("colwidth"))
            .collect();
        let count = tgroup
            .children()
            .filter(|c| c.tag() == &Tag::Colspec)
            .count()
            .max(tgroup.attrs().get_u32("cols").unwrap_or(0) as usize);
        match colwidths {
            Some(colwidths) if !self.auto && !colwidths.is_empty() => {
                self.widths = legacy_widths(&colwidths);
            }
            _ => {
                self.auto = true;
                self.widths = vec![0.0; count];
            }
        }
    }

    pub fn columns(&self) -> usize {
        self.widths.len()
    }

    pub fn environment(&self) -> &'static str {
        if self.caption.is_some() {
            "longtable"
        } else {
            "longtable*"
        }
    }

    fn bar(&self) -> &'static str {
        if self.style == TableStyle::Standard {
            "|"
        } else {
            ""
        }
    }

    fn colspecs(&self) -> String {
        let columns: Vec<String> = self
            .widths
            .iter()
            .map(|w| {
                if self.auto {
                    "l".to_string()
                } else {
                    format!("p{{{w:.3}\\DUtablewidth}}")
                }
            })
            .collect();
        let bar = self.bar();
        format!("{bar}{}{bar}", columns.join(bar))
    }

    /// Everything up to and including the top rule.
    pub fn begin(&self) -> String {
        let mut out = String::from("\n");
        if !self.auto {
            out.push_str("\\setlength{\\DUtablewidth}{\\linewidth}%\n");
        }
        out.push_str(&format!("\\begin{{{}}}", self.environment()));
        if let Some(align) = self.align {
            out.push_str(&format!("[{align}]"));
        }
        out.push_str(&format!("{{{}}}\n", self.colspecs()));
        if let Some(caption) = &self.caption {
            out.push_str(&format!("\\caption{{{caption}}}\\\\\n"));
        }
        out.push_str(self.top_rule());
        out
    }

    pub fn top_rule(&self) -> &'static str {
        match self.style {
            TableStyle::Standard => "\\hline\n",
            TableStyle::Booktabs => "\\toprule\n",
            TableStyle::Borderless => "",
        }
    }

    /// Rule after every row.
    pub fn row_rule(&self) -> &'static str {
        match self.style {
            TableStyle::Standard => "\\hline\n",
            _ => "",
        }
    }

    /// Rule between the header rows and the body.
    pub fn head_rule(&self) -> &'static str {
        match self.style {
            TableStyle::Booktabs => "\\midrule\n",
            _ => "",
        }
    }

    pub fn end(&self) -> String {
        let rule = match self.style {
            TableStyle::Booktabs => "\\bottomrule\n",
            _ => "",
        };
        format!("{rule}\\end{{{}}}\n", self.environment())
    }

    /// Column format of a cell spanning `span` columns from `start`.
    pub fn multicolumn(&self, start: usize, span: usize, bars: bool) -> String {
        let bar = if bars { self.bar() } else { "" };
        if self.auto {
            return format!("{bar}l{bar}");
        }
        let width: f64 = self.widths.iter().skip(start).take(span).sum();
        format!("{bar}p{{{width:.2}\\DUtablewidth}}{bar}")
    }

    /// Footer repeated on every page but the last.
    pub fn continued_footer(&self) -> String {
        format!(
            "\\multicolumn{{{}}}{{{}}}{{\\raggedleft\\ldots continued on next page}}\\\\\n\\endfoot\n\\endlastfoot\n",
            self.columns(),
            self.multicolumn(0, self.columns(), false)
        )
    }
}
