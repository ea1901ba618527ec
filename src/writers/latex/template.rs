//! Preamble pieces and assembly of the LaTeX parts.

use std::collections::BTreeSet;

use crate::settings::Settings;
use crate::writers::{Buffer, Parts, VERSION};

const PREAMBLE: &str = "% PDF Standard Fonts
\\usepackage{mathptmx} % Times
\\usepackage[scaled=.90]{helvet}
\\usepackage{courier}
";

const HYPERREF: &str = "
% hyperlinks:
\\ifdefined\\hypersetup
\\else
  \\usepackage[colorlinks=true,linkcolor=blue,urlcolor=blue]{hyperref}
  \\usepackage{bookmark}
  \\urlstyle{same} % normal text font (alternatives: tt, rm, sf)
\\fi
";

/// Package loads and settings in the order they appear in the preamble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(super) enum Requirement {
    Fontenc,
    Booktabs,
    Longtable,
    Graphicx,
    Textcomp,
    Alltt,
    Secnumdepth,
}

impl Requirement {
    fn latex(self) -> &'static str {
        match self {
            Requirement::Fontenc => "\\usepackage[T1]{fontenc}\n",
            Requirement::Booktabs => "\\usepackage{booktabs}\n",
            Requirement::Longtable => {
                "\\usepackage{longtable,ltcaption,array}
\\setlength{\\extrarowheight}{2pt}
\\newlength{\\DUtablewidth} % internal use in tables
"
            }
            Requirement::Graphicx => "\\usepackage{graphicx}\n",
            Requirement::Textcomp => "\\usepackage{textcomp} % text symbol macros\n",
            Requirement::Alltt => "\\usepackage{alltt}\n",
            Requirement::Secnumdepth => "\\setcounter{secnumdepth}{0}\n",
        }
    }
}

/// `\providecommand` definitions for the `DU*` macros used in the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(super) enum Fallback {
    Class,
    Title,
    DocumentSubtitle,
    Footnotes,
    Role,
    LineBlock,
    Transition,
}

impl Fallback {
    fn latex(self) -> &'static str {
        match self {
            Fallback::Class => {
                r##"
% class handling for environments (block-level elements)
% \begin{DUclass}{spam} tries \DUCLASSspam and
% \end{DUclass}{spam} tries \endDUCLASSspam
\ifdefined\DUclass
\else % poor man's "provideenvironment"
  \newenvironment{DUclass}[1]%
    {% "#1" does not work in end-part of environment.
     \def\DocutilsClassFunctionName{DUCLASS#1}
     \csname \DocutilsClassFunctionName \endcsname}%
    {\csname end\DocutilsClassFunctionName \endcsname}%
\fi
"##
            }
            Fallback::Title => {
                r"
% title for topics, admonitions, unsupported section levels, and sidebar
\providecommand*{\DUtitle}[1]{%
  \smallskip\noindent\textbf{#1}\smallskip}
"
            }
            Fallback::DocumentSubtitle => {
                r"
% subtitle (in document title)
\providecommand*{\DUdocumentsubtitle}[1]{{\large #1}}
"
            }
            Fallback::Footnotes => {
                r"
% numerical or symbol footnotes with hyperlinks and backlinks
\providecommand*{\DUfootnotemark}[3]{%
  \raisebox{1em}{\hypertarget{#1}{}}%
  \hyperlink{#2}{\textsuperscript{#3}}%
}
\providecommand{\DUfootnotetext}[4]{%
  \begingroup%
  \renewcommand{\thefootnote}{%
    \protect\raisebox{1em}{\protect\hypertarget{#1}{}}%
    \protect\hyperlink{#2}{#3}}%
  \footnotetext{#4}%
  \endgroup%
}
"
            }
            Fallback::Role => {
                r"
% custom inline roles: \DUrole{#1}{#2} tries \DUrole#1{#2}
\providecommand*{\DUrole}[2]{%
  \ifcsname DUrole#1\endcsname%
    \csname DUrole#1\endcsname{#2}%
  \else%
    #2%
  \fi%
}
"
            }
            Fallback::LineBlock => {
                r"
% line block environment
\ifdefined\DUlineblock
\else
  \newenvironment{DUlineblock}[1]{%
    \list{}{\setlength{\partopsep}{\parskip}
            \addtolength{\partopsep}{\baselineskip}
            \setlength{\topsep}{0pt}
            \setlength{\itemsep}{0.15\baselineskip}
            \setlength{\parsep}{0pt}
            \setlength{\leftmargin}{#1}}
    \raggedright
  }
  {\endlist}
\fi
"
            }
            Fallback::Transition => {
                r"
% transition (break / fancybreak / anonymous section)
\providecommand*{\DUtransition}{%
  \hspace*{\fill}\hrulefill\hspace*{\fill}
  \vskip 0.5\baselineskip
}
"
            }
        }
    }
}

/// Everything the LaTeX translator accumulates during a walk.
#[derive(Debug, Default)]
pub(super) struct Buffers {
    pub requirements: BTreeSet<Requirement>,
    pub fallbacks: BTreeSet<Fallback>,
    /// Extra `\hypersetup` entries (`pdftitle={...}`).
    pub pdfinfo: Vec<String>,
    pub titledata: String,
    pub body_pre_docinfo: Buffer,
    pub docinfo: Buffer,
    pub body: Buffer,
    pub header: Buffer,
    pub footer: Buffer,
    pub title: String,
    pub subtitle: String,
    /// An `svg` stylesheet was requested: SVG images use `\includesvg`.
    pub svg: bool,
}

impl Buffers {
    pub fn new(settings: &Settings) -> Self {
        let mut buffers = Self::default();
        buffers.requirements.insert(Requirement::Fontenc);
        buffers.svg = settings.stylesheet_path.iter().any(|s| s == "svg");
        buffers
    }
}

/// `\usepackage` or `\input` line for one stylesheet entry.
fn stylesheet_line(path: &str) -> String {
    if let Some(package) = path.strip_suffix(".sty") {
        return format!("\\usepackage{{{package}}}\n");
    }
    let has_extension = path
        .rsplit(['/', '\\'])
        .next()
        .is_some_and(|name| name.contains('.'));
    if has_extension {
        format!("\\input{{{path}}}\n")
    } else {
        format!("\\usepackage{{{path}}}\n")
    }
}

/// Assemble the parts from the finished buffers.
pub(super) fn assemble(buffers: &Buffers, settings: &Settings) -> Parts {
    let options = settings.documentoptions.trim();
    let head_prefix = if options.is_empty() {
        format!("\\documentclass{{{}}}\n", settings.documentclass)
    } else {
        format!("\\documentclass[{options}]{{{}}}\n", settings.documentclass)
    };
    let requirements: String = buffers.requirements.iter().map(|r| r.latex()).collect();
    let stylesheet: String = settings
        .stylesheet_path
        .iter()
        .map(|path| stylesheet_line(path))
        .collect();
    let fallbacks: String = buffers.fallbacks.iter().map(|f| f.latex()).collect();

    let mut pdfsetup = HYPERREF.to_string();
    if !buffers.pdfinfo.is_empty() {
        pdfsetup.push_str("\\hypersetup{\n");
        for entry in &buffers.pdfinfo {
            pdfsetup.push_str(&format!("  {entry},\n"));
        }
        pdfsetup.push_str("}\n");
    }

    let head = format!(
        "{head_prefix}% generated by docweave {VERSION} <https://crates.io/crates/docweave>
\\usepackage{{cmap}} % fix search and cut-and-paste in Acrobat
{requirements}
%%% Custom LaTeX preamble
{PREAMBLE}
%%% User specified packages and stylesheets
{stylesheet}
%%% Fallback definitions for docweave-specific commands
{fallbacks}{pdfsetup}"
    );

    let body_pre_docinfo = buffers.body_pre_docinfo.join();
    let docinfo = buffers.docinfo.join();
    let header = buffers.header.join();
    let body = buffers.body.join();
    let footer = buffers.footer.join();
    let whole = format!(
        "{head}\n%%% Body\n\\begin{{document}}\n{}{body_pre_docinfo}{docinfo}{header}{body}{footer}\n\\end{{document}}\n",
        buffers.titledata
    );

    let mut parts = Parts::new();
    parts.insert("body", body.clone());
    parts.insert("body_pre_docinfo", body_pre_docinfo);
    parts.insert("docinfo", docinfo);
    parts.insert("encoding", settings.output_encoding.clone());
    parts.insert("errors", settings.output_encoding_error_handler.to_string());
    parts.insert("fallbacks", fallbacks);
    parts.insert("footer", footer);
    parts.insert("fragment", body);
    parts.insert("head", head);
    parts.insert("head_prefix", head_prefix);
    parts.insert("header", header);
    parts.insert("latex_preamble", PREAMBLE);
    parts.insert("pdfsetup", pdfsetup);
    parts.insert("requirements", requirements);
    parts.insert("stylesheet", stylesheet);
    parts.insert("subtitle", buffers.subtitle.clone());
    parts.insert("title", buffers.title.clone());
    parts.insert("titledata", buffers.titledata.clone());
    parts.insert("version", VERSION);
    parts.insert("whole", whole);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requirement_order() {
        let mut buffers = Buffers::new(&Settings::default());
        buffers.requirements.insert(Requirement::Longtable);
        buffers.requirements.insert(Requirement::Booktabs);
        let parts = assemble(&buffers, &Settings::default());
        let requirements = parts.get("requirements").unwrap();
        assert!(requirements.starts_with("\\usepackage[T1]{fontenc}\n\\usepackage{booktabs}\n"));
        assert!(requirements.contains("\\newlength{\\DUtablewidth}"));
    }

    #[test]
    fn test_empty_document() {
        let parts = assemble(&Buffers::new(&Settings::default()), &Settings::default());
        let whole = parts.whole();
        assert!(whole.starts_with("\\documentclass[a4paper]{article}\n% generated by docweave"));
        assert!(whole.contains("\n%%% Custom LaTeX preamble\n% PDF Standard Fonts\n"));
        assert!(whole.ends_with("\\fi\n\n%%% Body\n\\begin{document}\n\n\\end{document}\n"));
    }

    #[test]
    fn test_class_fallback_keeps_hash_argument() {
        let mut buffers = Buffers::new(&Settings::default());
        buffers.fallbacks.insert(Fallback::Class);
        let parts = assemble(&buffers, &Settings::default());
        let fallbacks = parts.get("fallbacks").unwrap();
        assert!(fallbacks.contains("{% \"#1\" does not work in end-part of environment."));
        assert!(fallbacks.contains("\\def\\DocutilsClassFunctionName{DUCLASS#1}"));
        assert!(fallbacks.contains("{\\csname end\\DocutilsClassFunctionName \\endcsname}%\n\\fi\n"));
    }

    #[test]
    fn test_stylesheets() {
        assert_eq!(stylesheet_line("data/spam.sty"), "\\usepackage{data/spam}\n");
        assert_eq!(stylesheet_line("data/ham.tex"), "\\input{data/ham.tex}\n");
        assert_eq!(stylesheet_line("svg"), "\\usepackage{svg}\n");
        assert!(Buffers::new(&Settings::default().with_stylesheet("svg")).svg);
    }

    #[test]
    fn test_pdfinfo() {
        let mut buffers = Buffers::new(&Settings::default());
        buffers.pdfinfo.push("pdftitle={T}".to_string());
        let parts = assemble(&buffers, &Settings::default());
        assert!(parts
            .get("pdfsetup")
            .unwrap()
            .ends_with("\\fi\n\\hypersetup{\n  pdftitle={T},\n}\n"));
    }
}
