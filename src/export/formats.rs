use std::fmt;

use clap::ValueEnum;

use crate::scanner::ExportRequest;

/// Report template ids for the PDF "detailed vulnerability list" variants.
const PDF_TEMPLATE_BY_HOST: u32 = 48;
const PDF_TEMPLATE_BY_PLUGIN: u32 = 46;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ExportFormat {
    Nessus,
    Pdf,
    Csv,
    Html,
}

/// One file written per scan for a format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportVariant {
    /// Appended to the scan name to form the file name.
    pub suffix: &'static str,
    pub request: ExportRequest,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Nessus => "nessus",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Csv => "csv",
            ExportFormat::Html => "html",
        }
    }

    pub fn variants(self) -> Vec<ExportVariant> {
        match self {
            ExportFormat::Nessus => vec![ExportVariant {
                suffix: ".nessus",
                request: ExportRequest::new("nessus"),
            }],
            ExportFormat::Pdf => vec![
                ExportVariant {
                    suffix: "_dvl_by_host.pdf",
                    request: ExportRequest {
                        template_id: Some(PDF_TEMPLATE_BY_HOST),
                        ..ExportRequest::new("pdf")
                    },
                },
                ExportVariant {
                    suffix: "_dvl_by_plugin.pdf",
                    request: ExportRequest {
                        template_id: Some(PDF_TEMPLATE_BY_PLUGIN),
                        ..ExportRequest::new("pdf")
                    },
                },
            ],
            ExportFormat::Csv => vec![ExportVariant {
                suffix: ".csv",
                request: ExportRequest::new("csv"),
            }],
            ExportFormat::Html => vec![ExportVariant {
                suffix: ".html",
                request: ExportRequest {
                    chapters: Some("vuln_hosts_summary".to_string()),
                    ..ExportRequest::new("html")
                },
            }],
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `<scan-name><suffix>`, with path separators in the scan name replaced so
/// every export lands directly in the output directory.
pub fn export_file_name(scan_name: &str, suffix: &str) -> String {
    let safe: String = scan_name
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("{}{}", safe, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_names_parse_ignoring_case() {
        assert_eq!(<ExportFormat as ValueEnum>::from_str("PDF", true).unwrap(), ExportFormat::Pdf);
        assert_eq!(<ExportFormat as ValueEnum>::from_str("nessus", false).unwrap(), ExportFormat::Nessus);
        assert!(<ExportFormat as ValueEnum>::from_str("docx", true).is_err());
    }

    #[test]
    fn test_pdf_has_two_report_variants() {
        let variants = ExportFormat::Pdf.variants();
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].suffix, "_dvl_by_host.pdf");
        assert_eq!(variants[0].request.template_id, Some(48));
        assert_eq!(variants[1].suffix, "_dvl_by_plugin.pdf");
        assert_eq!(variants[1].request.template_id, Some(46));
    }

    #[test]
    fn test_file_names() {
        assert_eq!(export_file_name("Weekly Linux", ".nessus"), "Weekly Linux.nessus");
        assert_eq!(export_file_name("dmz/web", "_dvl_by_host.pdf"), "dmz_web_dvl_by_host.pdf");
    }
}
