
use serde::{Deserialize, Serialize};

/// One allele pair for a single locus; a locus may pair an allele with itself
#[derive(Clone, Debug, Deserialize, Eq, Serialize)]
pub struct Diplotype {
    /// allele ID for haplotype 1
    hap1: String,
    /// allele ID for haplotype 2
    hap2: String,
    /// combination diplotype label
    diplotype: String
}

impl Diplotype {
    pub fn new(hap1: &str, hap2: &str) -> Diplotype {
        Diplotype {
            hap1: hap1.to_string(),
            hap2: hap2.to_string(),
            diplotype: format!("{hap1}/{hap2}")
        }
    }

    /// Iterates over both alleles, including a repeat for homozygous pairs
    pub fn alleles(&self) -> impl Iterator<Item = &str> {
        [self.hap1.as_str(), self.hap2.as_str()].into_iter()
    }

    pub fn diplotype(&self) -> &str {
        &self.diplotype
    }
}

impl PartialEq for Diplotype {
    fn eq(&self, other: &Self) -> bool {
        // this allows for a swap in hap1/hap2 and we still report identity
        (self.hap1 == other.hap1 && self.hap2 == other.hap2) ||
            (self.hap1 == other.hap2 && self.hap2 == other.hap1)
    }
}

impl PartialOrd for Diplotype {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Diplotype {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // sort the haplotypes to make sure we are comparing the same ones
        let mut ordered_haps = [&self.hap1, &self.hap2];
        let mut ordered_other_haps = [&other.hap1, &other.hap2];
        ordered_haps.sort();
        ordered_other_haps.sort();
        ordered_haps.cmp(&ordered_other_haps)
    }
}

impl std::fmt::Display for Diplotype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.diplotype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swapped_equality() {
        let d1 = Diplotype::new("KIR2DL1*001", "KIR2DL1*002");
        let d2 = Diplotype::new("KIR2DL1*002", "KIR2DL1*001");
        assert_eq!(d1, d2);
        assert_eq!(d1.cmp(&d2), std::cmp::Ordering::Equal);
        assert_eq!(d1.diplotype(), "KIR2DL1*001/KIR2DL1*002");
        assert_eq!(d1.alleles().collect::<Vec<&str>>(), vec!["KIR2DL1*001", "KIR2DL1*002"]);
    }

    #[test]
    fn test_homozygous() {
        let d = Diplotype::new("KIR3DL2*001", "KIR3DL2*001");
        assert_eq!(d.to_string(), "KIR3DL2*001/KIR3DL2*001");
        assert_eq!(d.alleles().collect::<Vec<&str>>(), vec!["KIR3DL2*001"; 2]);
    }
}
