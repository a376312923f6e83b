/////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// TESTS
//////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use crate::Kinetics::rate_expressions::{Arrhenius, PressureStruct, ReactionKinetics};
    use crate::Mechanism::fixtures::cyclopropane_mechanism;
    use crate::ReactorsIVP::conditions::{Composition, ConditionError, ConditionSet};
    use crate::ReactorsIVP::simulation_driver::*;
    use crate::ReactorsIVP::reactor_solver::{SolverConfig, SolverError, SolverMethod};
    use crate::ReactorsIVP::units::Quantity;
    use approx::assert_relative_eq;
    use tempfile::tempdir;

    const REACTANT: &str = "cC3H6(1)";

    fn conditions(reactor: &str, temperatures: &[f64], duration_ms: f64) -> ConditionSet {
        ConditionSet {
            reactor_types: vec![reactor.to_string()],
            temperatures: temperatures.iter().map(|T| Quantity::new(*T, "K")).collect(),
            pressures: vec![Quantity::new(1.0, "bar")],
            compositions: vec![Composition::from([("smiles:C1CC1".to_string(), 1.0)])],
            durations: vec![Quantity::new(duration_ms, "ms")],
        }
    }

    fn driver(settings: DriverSettings) -> SimulationDriver {
        let mut driver = SimulationDriver::new(cyclopropane_mechanism(), settings);
        driver.load_model();
        driver
            .generate_conditions(&conditions("IdealGasConstPressureTemperatureReactor", &[1500.0], 0.5))
            .unwrap();
        driver
    }

    #[test]
    fn test_end_to_end_isomerisation() {
        let driver = driver(DriverSettings::default());
        let results = driver.simulate().unwrap();
        assert_eq!(results.len(), 1);
        let trajectory = results[0].as_ref().unwrap();
        assert_eq!(trajectory.scenario_index, 0);
        assert_relative_eq!(trajectory.final_time().unwrap(), 5e-4, max_relative = 1e-9);

        let series = trajectory.mole_fraction_series(REACTANT).unwrap();
        assert_relative_eq!(series[0], 1.0);
        assert!(trajectory.final_mole_fraction(REACTANT).unwrap() < series[0]);
        assert!(series.windows(2).all(|w| w[1] <= w[0]));
        for row in &trajectory.mole_fractions {
            assert_relative_eq!(row.iter().sum::<f64>(), 1.0, epsilon = 1e-6);
        }
        // first order decay at constant T
        let k = 1e13 * f64::exp(-65000.0 * 4.184 / (8.314462618 * 1500.0));
        assert_relative_eq!(
            trajectory.final_mole_fraction(REACTANT).unwrap(),
            f64::exp(-k * 5e-4),
            max_relative = 1e-3
        );
        for T in &trajectory.temperatures {
            assert_relative_eq!(*T, 1500.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_adiabatic_reactor_heats_up_and_keeps_enthalpy() {
        let mut driver = driver(DriverSettings::default());
        driver
            .generate_conditions(&conditions("IdealGasConstPressureReactor", &[1500.0], 0.5))
            .unwrap();
        let results = driver.simulate().unwrap();
        let trajectory = results[0].as_ref().unwrap();
        assert!(trajectory.temperatures.last().unwrap() > &1500.0);
        let h0 = trajectory.enthalpies[0];
        for h in &trajectory.enthalpies {
            assert_relative_eq!(*h, h0, max_relative = 1e-4);
        }
    }

    #[test]
    fn test_load_model_is_idempotent() {
        let mut driver = driver(DriverSettings::default());
        let first_model = driver.model().unwrap().clone();
        let first = driver.simulate().unwrap();
        driver.load_model();
        assert_eq!(driver.model().unwrap(), &first_model);
        let second = driver.simulate().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_thermo_change_needs_refresh() {
        let mut driver = driver(DriverSettings::default());
        let baseline = driver.simulate().unwrap().remove(0).unwrap();

        let source = driver.species()[1].clone();
        let updated = source.with_thermo(source.thermo.with_enthalpy_offset(1e4));
        let target = driver.modify_species_thermo(usize::MAX, &updated, true).unwrap();
        assert_eq!(target, 1);
        assert!(driver.sync_state().thermo_refresh_pending);
        assert!(driver.sync_state().unsynced_mutations());

        let stale = driver.simulate().unwrap().remove(0).unwrap();
        assert_eq!(stale.enthalpies, baseline.enthalpies);

        driver.refresh_model().unwrap();
        assert!(!driver.sync_state().thermo_refresh_pending);
        let refreshed = driver.simulate().unwrap().remove(0).unwrap();
        assert_relative_eq!(refreshed.enthalpies[0] - baseline.enthalpies[0], 1e4, epsilon = 1e-6);
        // the source mechanism is untouched until synced
        assert_eq!(driver.species()[1].thermo, source.thermo);
    }

    #[test]
    fn test_kinetics_change_is_immediate() {
        let mut driver = driver(DriverSettings::default());
        let before = driver.simulate().unwrap().remove(0).unwrap();
        let reaction = driver.reactions()[0].clone();
        let faster = reaction.with_kinetics(reaction.kinetics.with_scaled_prefactor(10.0).unwrap());
        driver.modify_reaction_kinetics(0, &faster).unwrap();
        assert!(!driver.sync_state().thermo_refresh_pending);

        let after = driver.simulate().unwrap().remove(0).unwrap();
        let x_before = before.final_mole_fraction(REACTANT).unwrap();
        let x_after = after.final_mole_fraction(REACTANT).unwrap();
        assert!(x_after < x_before);
        assert!(x_after < 1e-3);
    }

    #[test]
    fn test_mutation_targets_are_checked() {
        let mut unloaded = SimulationDriver::new(cyclopropane_mechanism(), DriverSettings::default());
        let species = unloaded.species()[0].clone();
        assert_eq!(
            unloaded.modify_species_thermo(0, &species, false).unwrap_err(),
            MutationError::ModelNotLoaded
        );
        assert_eq!(unloaded.simulate().unwrap_err(), DriverError::ModelNotLoaded);
        assert_eq!(unloaded.refresh_model().unwrap_err(), DriverError::ModelNotLoaded);

        let mut driver = driver(DriverSettings::default());
        assert_eq!(
            driver.modify_species_thermo(3, &species, false).unwrap_err(),
            MutationError::SpeciesIndex { index: 3, count: 3 }
        );
        let mut stranger = species.clone();
        stranger.label = "CH4".to_string();
        assert_eq!(
            driver.modify_species_thermo(0, &stranger, true).unwrap_err(),
            MutationError::UnknownSpecies("CH4".to_string())
        );

        let reaction = driver.reactions()[0].clone();
        assert_eq!(
            driver.modify_reaction_kinetics(1, &reaction).unwrap_err(),
            MutationError::ReactionIndex { index: 1, count: 1 }
        );
        let plog = reaction.with_kinetics(ReactionKinetics::Pressure(
            PressureStruct::new(vec![(1e5, Arrhenius::new(1.0, 0.0, 0.0))]).unwrap(),
        ));
        assert!(matches!(
            driver.modify_reaction_kinetics(0, &plog),
            Err(MutationError::KineticsTypeMismatch { index: 0, .. })
        ));
        assert!(!driver.sync_state().unsynced_mutations());
    }

    #[test]
    fn test_load_model_discards_unsynced_changes() {
        let mut driver = driver(DriverSettings::default());
        let reaction = driver.reactions()[0].clone();
        let faster = reaction.with_kinetics(reaction.kinetics.with_scaled_prefactor(10.0).unwrap());

        driver.modify_reaction_kinetics(0, &faster).unwrap();
        driver.load_model();
        assert!(!driver.sync_state().unsynced_mutations());
        assert_eq!(driver.model().unwrap().reaction(0).unwrap().kinetics, reaction.kinetics);

        driver.modify_reaction_kinetics(0, &faster).unwrap();
        driver.sync_mutations_to_source().unwrap();
        assert!(!driver.sync_state().unsynced_mutations());
        assert_eq!(driver.reactions()[0], faster);
        driver.load_model();
        assert_eq!(driver.model().unwrap().reaction(0).unwrap().kinetics, faster.kinetics);
    }

    #[test]
    fn test_failed_scenario_does_not_abort_others() {
        let dir = tempdir().unwrap();
        let settings = DriverSettings {
            output_directory: dir.path().to_path_buf(),
            save_csv: true,
            ..Default::default()
        };
        let mut driver = driver(settings);
        driver
            .generate_conditions(&conditions("IdealGasConstPressureTemperatureReactor", &[300.0, 1500.0], 0.5))
            .unwrap();
        // a negative activation energy this large overflows exp(-Ea/RT) at 300 K but not at 1500 K
        let reaction = driver.reactions()[0].clone();
        let overflowing = reaction.with_kinetics(ReactionKinetics::elementary(Arrhenius::new(1e-64, 0.0, -1.9e6)));
        driver.modify_reaction_kinetics(0, &overflowing).unwrap();
        let results = driver.simulate().unwrap();
        assert_eq!(results.len(), 2);
        let failure = results[0].as_ref().unwrap_err();
        assert_eq!(failure.scenario, 0);
        assert_eq!(failure.source, SolverError::NonFinite { t: 0.0 });
        let survivor = results[1].as_ref().unwrap();
        assert_eq!(survivor.scenario_index, 1);
        assert!(survivor.final_mole_fraction(REACTANT).unwrap() < 1.0);

        let plots = driver.plot(&results);
        assert_eq!(plots.len(), 1);
        assert!(dir.path().join("1_mole_fractions.svg").exists());
        assert!(!dir.path().join("0_mole_fractions.svg").exists());
        assert!(dir.path().join("1_trajectory.csv").exists());
    }

    #[test]
    fn test_solver_methods_agree() {
        let reference = driver(DriverSettings::default()).simulate().unwrap().remove(0).unwrap();
        let radau = DriverSettings {
            solver: SolverConfig {
                method: SolverMethod::Radau3,
                ..Default::default()
            },
            ..Default::default()
        };
        let other = driver(radau).simulate().unwrap().remove(0).unwrap();
        assert_relative_eq!(
            other.final_mole_fraction(REACTANT).unwrap(),
            reference.final_mole_fraction(REACTANT).unwrap(),
            max_relative = 1e-3
        );
    }

    #[test]
    fn test_termination_conversion() {
        let settings = DriverSettings {
            termination: Some(TerminationConversion {
                species: REACTANT.to_string(),
                conversion: 0.5,
            }),
            ..Default::default()
        };
        let driver = driver(settings);
        let trajectory = driver.simulate().unwrap().remove(0).unwrap();
        assert!(trajectory.final_time().unwrap() < 5e-4);
        let x = trajectory.final_mole_fraction(REACTANT).unwrap();
        assert!(x <= 0.5 && x > 0.2);
        let x_previous = trajectory.mole_fractions[trajectory.len() - 2][1];
        assert!(x_previous > 0.5);

        let unknown = DriverSettings {
            termination: Some(TerminationConversion {
                species: "CH4".to_string(),
                conversion: 0.5,
            }),
            ..Default::default()
        };
        assert_eq!(
            self::driver(unknown).simulate().unwrap_err(),
            DriverError::UnknownTerminationSpecies("CH4".to_string())
        );
    }

    #[test]
    fn test_conditions_errors_surface() {
        let mut driver = SimulationDriver::new(cyclopropane_mechanism(), DriverSettings::default());
        driver.load_model();
        assert_eq!(driver.simulate().unwrap_err(), DriverError::NoConditions);
        let mut bad = conditions("IdealGasReactor", &[1500.0], 0.5);
        bad.durations[0] = Quantity::new(0.5, "fortnight");
        assert!(matches!(
            driver.generate_conditions(&bad),
            Err(DriverError::Condition(ConditionError::UnknownUnit { .. }))
        ));
    }
}
