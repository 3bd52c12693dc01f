
use simple_error::{bail, SimpleError};

use crate::reference::panel::ReferencePanel;

/// Prints the statistics for a given reference panel
/// # Arguments
/// * `panel` - the panel to print the statistics for
pub fn print_stats(panel: &ReferencePanel) {
    let layout = panel.layout();
    println!("Reference panel layout:");
    println!("\tReference length: {}", layout.reference_len());
    println!("\tRegions: {} ({} exons, {} introns)", layout.regions().len(), layout.exons().count(), layout.introns().count());
    println!("\tExon positions: {}", layout.exon_len());

    let loci = panel.loci();
    println!("Reference panel alleles:");
    println!("\tTotal alleles: {}", panel.len());
    println!("\tTotal loci: {}", loci.len());
    for (locus, alleles) in loci.iter() {
        println!("\t\t{locus}: {}", alleles.len());
    }

    // per-region breakdown is only useful while debugging a new panel release
    if log::log_enabled!(log::Level::Debug) {
        println!();
        println!("Region statistics:");
        println!("index\ttype\tstart\tend\tlength");
        for (index, region) in layout.regions().iter().enumerate() {
            println!("{index}\t{}\t{}\t{}\t{}", region.kind(), region.start(), region.end(), region.len());
        }
    }
}

/// Extracts a slice of the first panel allele reported under a gene name
/// # Arguments
/// * `panel` - the panel to search
/// * `gene` - the reported gene name, e.g. "KIR2DL1"
/// * `start` - 0-based inclusive start
/// * `end` - 0-based exclusive end, clipped to the reference length
/// # Errors
/// * if the gene is not in the panel
/// * if the range is empty or starts beyond the reference
pub fn sequence_slice<'a>(panel: &'a ReferencePanel, gene: &str, start: usize, end: usize) -> Result<(&'a str, &'a [u8]), SimpleError> {
    let allele = match panel.first_allele_of_gene(gene) {
        Some(a) => a,
        None => bail!("Gene {gene} was not found in the reference panel")
    };
    let sequence = allele.sequence();
    if start >= end || start >= sequence.len() {
        bail!("Invalid range [{start}, {end}) for a reference of length {}", sequence.len());
    }
    let end = end.min(sequence.len());
    Ok((allele.allele_id(), &sequence[start..end]))
}

/// Prints a framed slice of the first allele of a gene
/// # Errors
/// * see `sequence_slice`
pub fn print_sequence_slice(panel: &ReferencePanel, gene: &str, start: usize, end: usize) -> Result<(), SimpleError> {
    let (allele_id, slice) = sequence_slice(panel, gene, start, end)?;
    println!("{allele_id} [{start}, {}):", start + slice.len());
    println!("{}", String::from_utf8_lossy(slice));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    use crate::reference::typing_config::TypingOptions;

    #[test]
    fn test_sequence_slice() {
        let panel = ReferencePanel::from_ipd_file(&PathBuf::from("test_data/tiny_panel.ipd"), &TypingOptions::default()).unwrap();
        let (allele_id, slice) = sequence_slice(&panel, "KIR3DL2", 4, 12).unwrap();
        assert_eq!(allele_id, "KIR3DL2*001");
        assert_eq!(slice, b"ACGTCCGA");

        // clipped to the reference
        let (_allele_id, slice) = sequence_slice(&panel, "KIR2DL1", 24, 100).unwrap();
        assert_eq!(slice, b"CCCC");

        // aliased loci are still searched by reported gene name
        assert!(sequence_slice(&panel, "KIR2DL5A", 0, 4).is_ok());
        assert!(sequence_slice(&panel, "KIR2DL5", 0, 4).is_err());
        assert!(sequence_slice(&panel, "KIR2DL1", 5, 5).is_err());
        assert!(sequence_slice(&panel, "KIR2DL1", 28, 30).is_err());
    }
}
