// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! Tab-delimited report export.
//!
//! One header row followed by one row per evaluated file pair:
//!
//! ```text
//! "RefFile"	"TestFile"	"Tc"	"To"	"Tu"	"Co"	"Cu"	"Cm"	"Cf"	"Cr"	"Ct"
//! "ref.lif"	"test.lif"	3	0	1	0	1	0	0	4	3
//! ```

use crate::{Error, metrics::FIELD_NAMES, metrics::SegmentationMetrics};
use csv::{QuoteStyle, Writer, WriterBuilder};
use std::{fs::File, io::Write, path::Path};

/// Writer for evaluation reports.
pub struct ReportWriter<W: Write> {
    writer: Writer<W>,
}

impl ReportWriter<File> {
    /// Create (or truncate) a report file and write its header.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Self::new(File::create(path)?)
    }
}

impl<W: Write> ReportWriter<W> {
    /// Wrap a writer and write the header row.
    pub fn new(inner: W) -> Result<Self, Error> {
        let mut writer = WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(QuoteStyle::NonNumeric)
            .from_writer(inner);

        let mut header = vec!["RefFile", "TestFile"];
        header.extend(FIELD_NAMES);
        writer.write_record(&header)?;
        Ok(Self { writer })
    }

    /// Append the metrics of one reference/test pair.
    pub fn write(
        &mut self,
        reference: &str,
        test: &str,
        metrics: &SegmentationMetrics,
    ) -> Result<(), Error> {
        let mut record = vec![reference.to_owned(), test.to_owned()];
        record.extend(metrics.values().iter().map(|value| value.to_string()));
        self.writer.write_record(&record)?;
        Ok(())
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W, Error> {
        self.writer
            .into_inner()
            .map_err(|e| Error::IoError(e.into_error()))
    }
}
