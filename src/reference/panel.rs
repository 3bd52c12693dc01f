
use log::{debug, trace};
use rustc_hash::FxHashMap as HashMap;
use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::Path;

use crate::kir::errors::ReferenceError;
use crate::reference::loci::{gene_name, locus_name};
use crate::reference::regions::RegionLayout;
use crate::reference::typing_config::TypingOptions;
use crate::util::file_io::open_buffered;

/// Separates region sub-sequences within a panel row
const REGION_DELIMITER: char = '|';

/// A single named allele sequence from the panel
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReferenceAllele {
    /// the full allele identifier, e.g. "KIR2DL1*0010101"
    allele_id: String,
    /// the gene prefix as reported in the panel
    gene_name: String,
    /// the typed locus, after aliasing
    locus: String,
    /// the full gapped sequence in shared reference coordinates
    sequence: Vec<u8>
}

impl ReferenceAllele {
    pub fn allele_id(&self) -> &str {
        &self.allele_id
    }

    pub fn gene_name(&self) -> &str {
        &self.gene_name
    }

    pub fn locus(&self) -> &str {
        &self.locus
    }

    pub fn sequence(&self) -> &[u8] {
        &self.sequence
    }

    /// The symbol this allele carries at a reference position
    pub fn nucleotide(&self, position: usize) -> Option<u8> {
        self.sequence.get(position).copied()
    }
}

/// The multi-allele reference panel with its region layout
#[derive(Clone, Debug)]
pub struct ReferencePanel {
    /// alleles in panel order
    alleles: Vec<ReferenceAllele>,
    /// allele ID to index into `alleles`
    allele_index: HashMap<String, usize>,
    /// the shared intron/exon layout
    layout: RegionLayout
}

impl ReferencePanel {
    /// Creates a panel from already split allele sequences, verifying the shared coordinate space.
    /// # Arguments
    /// * `alleles` - ordered (allele ID, full sequence) pairs
    /// * `layout` - the intron/exon layout all sequences share
    /// * `locus_aliases` - reported gene name to typed locus
    /// # Errors
    /// * if no alleles are provided
    /// * if any sequence length differs from the layout length
    /// * if an allele ID is repeated
    pub fn new(alleles: Vec<(String, Vec<u8>)>, layout: RegionLayout, locus_aliases: &BTreeMap<String, String>) -> Result<ReferencePanel, ReferenceError> {
        if alleles.is_empty() {
            return Err(ReferenceError::NoAlleles);
        }

        let expected = layout.reference_len();
        let mut allele_index: HashMap<String, usize> = Default::default();
        let mut panel_alleles = Vec::with_capacity(alleles.len());
        for (allele_id, sequence) in alleles.into_iter() {
            if sequence.len() != expected {
                return Err(ReferenceError::InconsistentLength { allele_id, length: sequence.len(), expected });
            }
            if allele_index.insert(allele_id.clone(), panel_alleles.len()).is_some() {
                return Err(ReferenceError::DuplicateAllele { allele_id });
            }
            panel_alleles.push(ReferenceAllele {
                gene_name: gene_name(&allele_id).to_string(),
                locus: locus_name(&allele_id, locus_aliases),
                allele_id,
                sequence
            });
        }

        Ok(ReferencePanel {
            alleles: panel_alleles,
            allele_index,
            layout
        })
    }

    /// Loads a panel from an `.ipd` alignment file, optionally gzipped.
    /// # Arguments
    /// * `filename` - the panel file path
    /// * `options` - the typing options with header length and alias rules
    /// # Errors
    /// * if the file cannot be opened or read
    /// * if the panel content is malformed
    pub fn from_ipd_file(filename: &Path, options: &TypingOptions) -> Result<ReferencePanel, Box<dyn std::error::Error>> {
        let reader = open_buffered(filename)?;
        Self::from_ipd_reader(reader, options)
    }

    /// Parses `.ipd` rows of the form `ID<TAB>intron|exon|intron...<TAB>...`; spaces are ignored.
    /// Rows without a sequence column (e.g. footers) are skipped.
    /// The region layout is derived from the first allele row.
    /// # Arguments
    /// * `reader` - buffered source of panel lines
    /// * `options` - the typing options with header length and alias rules
    /// # Errors
    /// * if reading fails
    /// * if the panel content is malformed
    pub fn from_ipd_reader<R: BufRead>(reader: R, options: &TypingOptions) -> Result<ReferencePanel, Box<dyn std::error::Error>> {
        let mut alleles: Vec<(String, Vec<u8>)> = vec![];
        let mut layout: Option<RegionLayout> = None;

        for (line_index, line) in reader.lines().enumerate().skip(options.header_lines) {
            let line = line?;
            let cleaned: String = line.chars()
                .filter(|c| *c != ' ' && *c != '\r')
                .collect();
            let mut fields = cleaned.split('\t');
            let allele_id = fields.next().unwrap_or_default();
            let sequence_field = fields.next().unwrap_or_default();
            if allele_id.is_empty() && sequence_field.is_empty() {
                continue;
            }
            if sequence_field.is_empty() {
                debug!("Skipping panel line {} without a sequence column", line_index + 1);
                continue;
            }
            if allele_id.is_empty() {
                return Err(Box::new(ReferenceError::MalformedRow {
                    line_number: line_index + 1,
                    reason: "missing allele identifier".to_string()
                }));
            }

            let region_lengths: Vec<usize> = sequence_field.split(REGION_DELIMITER)
                .map(|region| region.len())
                .collect();
            if layout.is_none() {
                let first_layout = RegionLayout::from_region_lengths(&region_lengths)?;
                debug!("Region layout derived from {allele_id}: {} regions, {} exon positions", first_layout.regions().len(), first_layout.exon_len());
                layout = Some(first_layout);
            }

            let sequence: Vec<u8> = sequence_field.bytes()
                .filter(|&b| b != REGION_DELIMITER as u8)
                .collect();
            trace!("Loaded {allele_id} with {} regions", region_lengths.len());
            alleles.push((allele_id.to_string(), sequence));
        }

        let layout = layout.ok_or(ReferenceError::NoAlleles)?;
        Ok(Self::new(alleles, layout, &options.locus_aliases)?)
    }

    // getters
    pub fn alleles(&self) -> &[ReferenceAllele] {
        &self.alleles
    }

    pub fn layout(&self) -> &RegionLayout {
        &self.layout
    }

    pub fn len(&self) -> usize {
        self.alleles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alleles.is_empty()
    }

    pub fn get(&self, allele_id: &str) -> Option<&ReferenceAllele> {
        self.allele_index.get(allele_id).map(|&i| &self.alleles[i])
    }

    /// The symbol an allele carries at a reference position.
    /// Returns None for unknown alleles or positions outside the panel.
    pub fn nucleotide(&self, allele_id: &str, position: usize) -> Option<u8> {
        self.get(allele_id).and_then(|a| a.nucleotide(position))
    }

    /// Groups allele IDs by typed locus, preserving panel order within each locus
    pub fn loci(&self) -> BTreeMap<String, Vec<&str>> {
        let mut ret: BTreeMap<String, Vec<&str>> = Default::default();
        for allele in self.alleles.iter() {
            ret.entry(allele.locus.clone()).or_default().push(&allele.allele_id);
        }
        ret
    }

    /// Returns the first allele in the panel reported under a gene name
    pub fn first_allele_of_gene(&self, gene: &str) -> Option<&ReferenceAllele> {
        self.alleles.iter().find(|a| a.gene_name == gene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    fn test_options() -> TypingOptions {
        TypingOptions {
            header_lines: 2,
            ..Default::default()
        }
    }

    const SMALL_PANEL: &str = "header line one
header line two
KIR2DL1*001\tAA|CG|TT\t\t\t\t
KIR2DL1*002\tAA|CC|TT\t\t\t\t
KIR2DL5A*001 \tAA | .G|TT\t\t\t\t
KIR2DL5B*001\tAT|CG|TA\t\t\t\t
Footer without sequence
";

    #[test]
    fn test_parse_panel() {
        let panel = ReferencePanel::from_ipd_reader(Cursor::new(SMALL_PANEL), &test_options()).unwrap();
        assert_eq!(panel.len(), 4);
        assert_eq!(panel.layout().reference_len(), 6);
        assert_eq!(panel.layout().exon_positions().collect::<Vec<usize>>(), vec![2, 3]);

        let allele = panel.get("KIR2DL5A*001").unwrap();
        assert_eq!(allele.sequence(), b"AA.GTT");
        assert_eq!(allele.gene_name(), "KIR2DL5A");
        assert_eq!(allele.locus(), "KIR2DL5");
        assert_eq!(panel.nucleotide("KIR2DL1*002", 3), Some(b'C'));
        assert_eq!(panel.nucleotide("KIR2DL1*002", 6), None);
        assert_eq!(panel.nucleotide("KIR9*001", 0), None);

        let loci = panel.loci();
        assert_eq!(loci.len(), 2);
        assert_eq!(loci["KIR2DL1"], vec!["KIR2DL1*001", "KIR2DL1*002"]);
        assert_eq!(loci["KIR2DL5"], vec!["KIR2DL5A*001", "KIR2DL5B*001"]);

        assert_eq!(panel.first_allele_of_gene("KIR2DL1").unwrap().allele_id(), "KIR2DL1*001");
        assert!(panel.first_allele_of_gene("KIR3DL3").is_none());
    }

    #[test]
    fn test_inconsistent_length() {
        let bad_panel = "h\nh\nKIR2DL1*001\tAA|CG|TT\nKIR2DL1*002\tAA|CGG|TT\n";
        let result = ReferencePanel::from_ipd_reader(Cursor::new(bad_panel), &test_options());
        let err = result.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ReferenceError>(),
            Some(&ReferenceError::InconsistentLength { allele_id: "KIR2DL1*002".to_string(), length: 7, expected: 6 })
        );
    }

    #[test]
    fn test_missing_regions() {
        let bad_panel = "h\nh\nKIR2DL1*001\tAACGTT\n";
        let result = ReferencePanel::from_ipd_reader(Cursor::new(bad_panel), &test_options());
        let err = result.unwrap_err();
        assert_eq!(err.downcast_ref::<ReferenceError>(), Some(&ReferenceError::MissingExons { num_regions: 1 }));

        let empty_panel = "h\nh\n";
        let result = ReferencePanel::from_ipd_reader(Cursor::new(empty_panel), &test_options());
        assert_eq!(result.unwrap_err().downcast_ref::<ReferenceError>(), Some(&ReferenceError::NoAlleles));
    }

    #[test]
    fn test_duplicate_allele() {
        let layout = RegionLayout::from_region_lengths(&[1, 1]).unwrap();
        let alleles = vec![
            ("G1*001".to_string(), b"AC".to_vec()),
            ("G1*001".to_string(), b"AG".to_vec())
        ];
        let result = ReferencePanel::new(alleles, layout, &BTreeMap::new());
        assert_eq!(result.unwrap_err(), ReferenceError::DuplicateAllele { allele_id: "G1*001".to_string() });
    }
}
