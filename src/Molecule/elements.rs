//! Standard atomic weights and the valences used to complete implicit hydrogens.

/// element data: symbol, atomic mass (g/mol) and the normal valences in increasing order
pub struct Element {
    pub name: &'static str,
    pub atomic_mass: f64,
    pub valences: &'static [u8],
}

const ELEMENTS: &[Element] = &[
    Element {
        name: "H",
        atomic_mass: 1.008,
        valences: &[1],
    },
    Element {
        name: "He",
        atomic_mass: 4.0026,
        valences: &[0],
    },
    Element {
        name: "B",
        atomic_mass: 10.81,
        valences: &[3],
    },
    Element {
        name: "C",
        atomic_mass: 12.011,
        valences: &[4],
    },
    Element {
        name: "N",
        atomic_mass: 14.007,
        valences: &[3, 5],
    },
    Element {
        name: "O",
        atomic_mass: 15.999,
        valences: &[2],
    },
    Element {
        name: "F",
        atomic_mass: 18.998,
        valences: &[1],
    },
    Element {
        name: "Ne",
        atomic_mass: 20.18,
        valences: &[0],
    },
    Element {
        name: "Si",
        atomic_mass: 28.085,
        valences: &[4],
    },
    Element {
        name: "P",
        atomic_mass: 30.974,
        valences: &[3, 5],
    },
    Element {
        name: "S",
        atomic_mass: 32.065,
        valences: &[2, 4, 6],
    },
    Element {
        name: "Cl",
        atomic_mass: 35.45,
        valences: &[1],
    },
    Element {
        name: "Ar",
        atomic_mass: 39.948,
        valences: &[0],
    },
    Element {
        name: "Br",
        atomic_mass: 79.904,
        valences: &[1],
    },
    Element {
        name: "Kr",
        atomic_mass: 83.798,
        valences: &[0],
    },
    Element {
        name: "I",
        atomic_mass: 126.904,
        valences: &[1],
    },
    Element {
        name: "Xe",
        atomic_mass: 131.293,
        valences: &[0],
    },
];

/// case-insensitive lookup, so that Chemkin spellings like "AR" are accepted
pub fn find_element(symbol: &str) -> Option<&'static Element> {
    ELEMENTS
        .iter()
        .find(|element| element.name.eq_ignore_ascii_case(symbol))
}

/// atomic mass in g/mol
pub fn atomic_mass(symbol: &str) -> Option<f64> {
    find_element(symbol).map(|element| element.atomic_mass)
}

/// canonical spelling of an element symbol ("AR" -> "Ar")
pub fn canonical_symbol(symbol: &str) -> Option<&'static str> {
    find_element(symbol).map(|element| element.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(canonical_symbol("AR"), Some("Ar"));
        assert_eq!(canonical_symbol("cl"), Some("Cl"));
        assert_eq!(atomic_mass("C"), Some(12.011));
        assert!(find_element("Xx").is_none());
    }

    #[test]
    fn test_valences_are_sorted() {
        for element in ELEMENTS {
            let mut sorted = element.valences.to_vec();
            sorted.sort();
            assert_eq!(sorted, element.valences.to_vec(), "{}", element.name);
        }
    }
}
