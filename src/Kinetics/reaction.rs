//! A reaction of a mechanism: stoichiometry in terms of species indices, reversibility and the
//! rate constant function.
use crate::Kinetics::rate_expressions::{Arrhenius, RateCoefficient, ReactionKinetics, ReactionType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    /// (species index, stoichiometric coefficient)
    pub reactants: Vec<(usize, f64)>,
    pub products: Vec<(usize, f64)>,
    pub reversible: bool,
    pub duplicate: bool,
    pub kinetics: ReactionKinetics,
    /// explicit reverse rate (REV); when absent the reverse rate follows from equilibrium
    pub reverse_kinetics: Option<Arrhenius>,
}

impl Reaction {
    pub fn new(
        reactants: Vec<(usize, f64)>,
        products: Vec<(usize, f64)>,
        reversible: bool,
        kinetics: ReactionKinetics,
    ) -> Self {
        Reaction {
            reactants,
            products,
            reversible,
            duplicate: false,
            kinetics,
            reverse_kinetics: None,
        }
    }

    /// copy of the reaction with other kinetics
    pub fn with_kinetics(&self, kinetics: ReactionKinetics) -> Reaction {
        Reaction {
            kinetics,
            ..self.clone()
        }
    }

    pub fn reaction_type(&self) -> ReactionType {
        self.kinetics.reaction_type()
    }

    /// sum of the reactant coefficients; the third body of a three-body reaction counts as one more
    pub fn reaction_order(&self) -> f64 {
        let order: f64 = self.reactants.iter().map(|(_, nu)| nu).sum();
        match self.reaction_type() {
            ReactionType::ThreeBody => order + 1.0,
            _ => order,
        }
    }

    /// change of the number of moles, Σν(products) - Σν(reactants)
    pub fn delta_moles(&self) -> f64 {
        self.products.iter().map(|(_, nu)| nu).sum::<f64>()
            - self.reactants.iter().map(|(_, nu)| nu).sum::<f64>()
    }

    /// net stoichiometric coefficient of a species
    pub fn net_coefficient(&self, species: usize) -> f64 {
        let produced: f64 = self
            .products
            .iter()
            .filter(|(s, _)| *s == species)
            .map(|(_, nu)| nu)
            .sum();
        let consumed: f64 = self
            .reactants
            .iter()
            .filter(|(s, _)| *s == species)
            .map(|(_, nu)| nu)
            .sum();
        produced - consumed
    }

    pub fn species_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.reactants
            .iter()
            .chain(self.products.iter())
            .map(|(s, _)| *s)
    }

    /// Chemkin-style equation, e.g. `H+O2(+M)<=>HO2(+M)`
    pub fn equation<S: AsRef<str>>(&self, labels: &[S]) -> String {
        let third_body = match &self.kinetics {
            ReactionKinetics::ThreeBody(data) => Some(match data.eff.is_single_collider() {
                Some(i) => format!("+{}", label_of(labels, i)),
                None => "+M".to_string(),
            }),
            ReactionKinetics::Falloff(data) => Some(match data.eff.is_single_collider() {
                Some(i) => format!("(+{})", label_of(labels, i)),
                None => "(+M)".to_string(),
            }),
            _ => None,
        };
        let side = |terms: &[(usize, f64)]| -> String {
            let mut text = terms
                .iter()
                .map(|(s, nu)| {
                    let name = label_of(labels, *s);
                    if (*nu - 1.0).abs() < 1e-12 {
                        name
                    } else if nu.fract() == 0.0 {
                        format!("{}{}", *nu as i64, name)
                    } else {
                        format!("{}{}", nu, name)
                    }
                })
                .collect::<Vec<_>>()
                .join("+");
            if let Some(tb) = &third_body {
                text.push_str(tb);
            }
            text
        };
        let arrow = if self.reversible { "<=>" } else { "=>" };
        format!("{}{}{}", side(&self.reactants), arrow, side(&self.products))
    }
}

fn label_of<S: AsRef<str>>(labels: &[S], index: usize) -> String {
    labels
        .get(index)
        .map(|l| l.as_ref().to_string())
        .unwrap_or_else(|| format!("#{}", index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Kinetics::rate_expressions::{Efficiencies, FalloffStruct, ThreeBodyStruct};

    const LABELS: [&str; 5] = ["H", "O2", "HO2", "O", "AR"];

    #[test]
    fn test_equation_and_order() {
        let reaction = Reaction::new(
            vec![(0, 1.0), (1, 1.0)],
            vec![(2, 1.0)],
            true,
            ReactionKinetics::Falloff(FalloffStruct {
                high_rate: Arrhenius::new(1.0, 0.0, 0.0),
                low_rate: Arrhenius::new(1.0, 0.0, 0.0),
                troe: None,
                eff: Efficiencies::default(),
            }),
        );
        assert_eq!(reaction.equation(&LABELS), "H+O2(+M)<=>HO2(+M)");
        assert_eq!(reaction.reaction_order(), 2.0);
        assert_eq!(reaction.delta_moles(), -1.0);
        assert_eq!(reaction.net_coefficient(1), -1.0);
        assert_eq!(reaction.net_coefficient(2), 1.0);
        assert_eq!(reaction.net_coefficient(4), 0.0);

        let recombination = Reaction::new(
            vec![(3, 2.0)],
            vec![(1, 1.0)],
            false,
            ReactionKinetics::ThreeBody(ThreeBodyStruct {
                arrhenius: Arrhenius::new(1.0, 0.0, 0.0),
                eff: Efficiencies::single_collider(4),
            }),
        );
        assert_eq!(recombination.equation(&LABELS), "2O+AR=>O2+AR");
        assert_eq!(recombination.reaction_order(), 3.0);
        assert_eq!(recombination.species_indices().collect::<Vec<_>>(), vec![3, 1]);
    }

    #[test]
    fn test_with_kinetics_leaves_original() {
        let reaction = Reaction::new(
            vec![(0, 1.0)],
            vec![(3, 1.0)],
            false,
            ReactionKinetics::elementary(Arrhenius::new(1.0, 0.0, 0.0)),
        );
        let faster = reaction.with_kinetics(ReactionKinetics::elementary(Arrhenius::new(9.0, 0.0, 0.0)));
        assert_eq!(reaction.kinetics.prefactor(), Some(1.0));
        assert_eq!(faster.kinetics.prefactor(), Some(9.0));
        assert_eq!(faster.reactants, reaction.reactants);
    }
}
