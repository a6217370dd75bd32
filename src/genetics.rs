use crate::errors::AssociationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The loci a survey records.
///
/// Each locus carries its two alleles as data. The first allele is the
/// major one, so genotype order is always homozygous-major, heterozygous,
/// homozygous-minor.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Locus {
    /// VDR FokI, alleles C and T.
    VdrFokI,
    /// BsmI, alleles A and G.
    Bsm,
}

impl Locus {
    pub const ALL: [Locus; 2] = [Locus::VdrFokI, Locus::Bsm];

    /// Name of the dataset column holding this locus.
    pub fn column(self) -> &'static str {
        match self {
            Locus::VdrFokI => "VDR FokI",
            Locus::Bsm => "BSM",
        }
    }

    /// Major and minor allele.
    pub fn alleles(self) -> (char, char) {
        match self {
            Locus::VdrFokI => ('C', 'T'),
            Locus::Bsm => ('A', 'G'),
        }
    }

    pub fn from_column(column: &str) -> Option<Locus> {
        Locus::ALL.iter().copied().find(|l| l.column() == column)
    }

    /// Canonical symbol of a genotype at this locus, e.g. `CT`.
    pub fn symbol(self, genotype: Genotype) -> String {
        let (major, minor) = self.alleles();
        match genotype {
            Genotype::HomozygousMajor => format!("{}{}", major, major),
            Genotype::Heterozygous => format!("{}{}", major, minor),
            Genotype::HomozygousMinor => format!("{}{}", minor, minor),
        }
    }

    /// The three canonical symbols in genotype order.
    pub fn alphabet(self) -> [String; 3] {
        Genotype::ALL.map(|g| self.symbol(g))
    }

    /// Parses a genotype call.
    ///
    /// This is the single normalization point for genotype values:
    /// whitespace is trimmed, letters are upper-cased, one `/` or `|`
    /// between the alleles is dropped and a transposed heterozygote
    /// (`TC`) is read as the canonical one (`CT`).
    pub fn parse_genotype(self, value: &str) -> Result<Genotype, AssociationError> {
        let unknown = || AssociationError::UnknownGenotype(self.to_string(), value.to_string());
        let cleaned: Vec<char> = value
            .trim()
            .chars()
            .filter(|c| *c != '/' && *c != '|')
            .map(|c| c.to_ascii_uppercase())
            .collect();
        let separators = value.trim().chars().filter(|c| *c == '/' || *c == '|').count();
        if cleaned.len() != 2 || separators > 1 {
            return Err(unknown());
        }

        let (major, minor) = self.alleles();
        match (cleaned[0], cleaned[1]) {
            (a, b) if a == major && b == major => Ok(Genotype::HomozygousMajor),
            (a, b) if a == minor && b == minor => Ok(Genotype::HomozygousMinor),
            (a, b) if (a == major && b == minor) || (a == minor && b == major) => {
                Ok(Genotype::Heterozygous)
            }
            _ => Err(unknown()),
        }
    }
}

impl fmt::Display for Locus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Locus {
    type Err = AssociationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Locus::ALL
            .iter()
            .copied()
            .find(|l| l.column().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                AssociationError::InvalidParameter(
                    "locus".to_string(),
                    format!("one of {}, {}", Locus::VdrFokI, Locus::Bsm),
                    s.to_string(),
                )
            })
    }
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Genotype {
    HomozygousMajor,
    Heterozygous,
    HomozygousMinor,
}

impl Genotype {
    pub const ALL: [Genotype; 3] = [
        Genotype::HomozygousMajor,
        Genotype::Heterozygous,
        Genotype::HomozygousMinor,
    ];

    /// Position in genotype order.
    pub fn index(self) -> usize {
        match self {
            Genotype::HomozygousMajor => 0,
            Genotype::Heterozygous => 1,
            Genotype::HomozygousMinor => 2,
        }
    }

    /// Copies of the (major, minor) allele carried by this genotype.
    pub fn allele_copies(self) -> (u64, u64) {
        match self {
            Genotype::HomozygousMajor => (2, 0),
            Genotype::Heterozygous => (1, 1),
            Genotype::HomozygousMinor => (0, 2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_alphabets_follow_allele_order() {
        assert_eq!(Locus::VdrFokI.alphabet(), ["CC", "CT", "TT"]);
        assert_eq!(Locus::Bsm.alphabet(), ["AA", "AG", "GG"]);
    }

    #[test]
    fn test_transposed_heterozygote_is_canonical() -> Result<(), Box<dyn Error>> {
        assert_eq!(Locus::VdrFokI.parse_genotype("TC")?, Genotype::Heterozygous);
        assert_eq!(Locus::VdrFokI.parse_genotype("CT")?, Genotype::Heterozygous);
        assert_eq!(Locus::Bsm.parse_genotype("GA")?, Genotype::Heterozygous);
        Ok(())
    }

    #[test]
    fn test_whitespace_case_and_separator() -> Result<(), Box<dyn Error>> {
        assert_eq!(Locus::Bsm.parse_genotype(" gg ")?, Genotype::HomozygousMinor);
        assert_eq!(Locus::VdrFokI.parse_genotype("C/T")?, Genotype::Heterozygous);
        assert_eq!(Locus::VdrFokI.parse_genotype("c|c")?, Genotype::HomozygousMajor);
        Ok(())
    }

    #[test]
    fn test_genotype_from_other_locus_is_rejected() {
        assert!(matches!(
            Locus::VdrFokI.parse_genotype("AG"),
            Err(AssociationError::UnknownGenotype(_, _))
        ));
        assert!(Locus::Bsm.parse_genotype("CT").is_err());
        assert!(Locus::Bsm.parse_genotype("A").is_err());
        assert!(Locus::Bsm.parse_genotype("AAG").is_err());
        assert!(Locus::Bsm.parse_genotype("A//G").is_err());
        assert!(Locus::Bsm.parse_genotype("").is_err());
    }

    #[test]
    fn test_locus_from_str_and_column() -> Result<(), Box<dyn Error>> {
        assert_eq!("vdr foki".parse::<Locus>()?, Locus::VdrFokI);
        assert_eq!(Locus::from_column("BSM"), Some(Locus::Bsm));
        assert_eq!(Locus::from_column("Grupa"), None);
        assert!("ApaI".parse::<Locus>().is_err());
        Ok(())
    }

    #[test]
    fn test_allele_copies() {
        let total: (u64, u64) = Genotype::ALL.iter().fold((0, 0), |acc, g| {
            let (a, b) = g.allele_copies();
            (acc.0 + a, acc.1 + b)
        });
        assert_eq!(total, (3, 3));
    }
}
