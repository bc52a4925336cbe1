//! Extract the text layer of a PDF into `.txt` and `.md` transcripts.
//!
//! A thin shim over [`pdf_textract::cli::run`].

use pdf_textract::ExtractionMethod;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pdf_textract::cli::run(ExtractionMethod::Direct).await
}
