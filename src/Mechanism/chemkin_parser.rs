//! # Chemkin mechanism reader
//!
//! Reads the four sections of a Chemkin input file written by a mechanism generator:
//!  - ELEMENTS (ELEM) and SPECIES (SPEC): whitespace separated names closed by END
//!  - THERMO (THERM, optionally followed by ALL): an optional line with the global low, middle and
//!    high temperatures and then four-line fixed-column NASA7 records
//!  - REACTIONS (REAC): unit keywords on the header line, one line per reaction
//!    `equation A n Ea` followed by auxiliary lines (LOW, TROE, PLOG, REV, DUPLICATE and
//!    third-body efficiencies `H2/2.4/ H2O/15.4/`)
//!
//! Everything after `!` is a comment. Rate parameters are converted to SI on the way in: the
//! prefactor from cm, mol (or molecules), s by the reaction order, the activation energy to J/mol,
//! PLOG pressures from atm to Pa.
use crate::Kinetics::rate_expressions::{
    Arrhenius, Efficiencies, FalloffStruct, PressureStruct, ReactionKinetics, ThreeBodyStruct, Troe,
};
use crate::Kinetics::reaction::Reaction;
use crate::Mechanism::mechanism_error::MechanismError;
use crate::Thermodynamics::nasa_polynomials::Nasa7;
use crate::Thermodynamics::thermo_model::R;
use log::{debug, warn};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

const AVOGADRO: f64 = 6.02214076e23;
const ATM: f64 = 101325.0;
const FARADAY: f64 = 96485.33212;

/// `KEY / values /` groups of auxiliary lines
static AUXILIARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^\s/]+)\s*/([^/]*)/").unwrap());
/// stoichiometric coefficient in front of a species name
static COEFFICIENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+(\.\d*)?|^\.\d+").unwrap());

/// content of one Chemkin file; reactions refer to species by their position in `species`
#[derive(Debug, Clone, Default)]
pub struct ChemkinData {
    pub elements: Vec<String>,
    pub species: Vec<String>,
    pub thermo: HashMap<String, Nasa7>,
    pub reactions: Vec<Reaction>,
    /// line on which each reaction starts
    pub reaction_lines: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReactionUnits {
    /// J/mol per unit of the activation energy column
    pub energy_factor: f64,
    /// prefactors per molecule instead of per mole
    pub molecules: bool,
}

impl Default for ReactionUnits {
    fn default() -> Self {
        ReactionUnits {
            energy_factor: 4.184,
            molecules: false,
        }
    }
}

impl ReactionUnits {
    fn from_keywords(keywords: &[&str]) -> Result<Self, String> {
        let mut units = ReactionUnits::default();
        for keyword in keywords {
            match keyword.to_uppercase().as_str() {
                "CAL/MOLE" | "CAL/MOL" => units.energy_factor = 4.184,
                "KCAL/MOLE" | "KCAL/MOL" => units.energy_factor = 4184.0,
                "JOULES/MOLE" | "JOULES/MOL" | "J/MOL" => units.energy_factor = 1.0,
                "KJOULES/MOLE" | "KJOULES/MOL" | "KJ/MOL" => units.energy_factor = 1000.0,
                "KELVINS" | "KELVIN" => units.energy_factor = R,
                "EVOLTS" | "EV" => units.energy_factor = FARADAY,
                "MOLES" | "MOLE" => units.molecules = false,
                "MOLECULES" => units.molecules = true,
                other => return Err(format!("unknown unit keyword '{}'", other)),
            }
        }
        Ok(units)
    }

    /// prefactor in m, mol, s for a rate constant of the given order
    pub fn prefactor(&self, A: f64, order: f64) -> f64 {
        let per_mole = if self.molecules {
            A * AVOGADRO.powf(order - 1.0)
        } else {
            A
        };
        per_mole * 1e-6_f64.powf(order - 1.0)
    }

    pub fn activation_energy(&self, Ea: f64) -> f64 {
        Ea * self.energy_factor
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    None,
    Elements,
    Species,
    Thermo,
    Reactions,
}

fn section_keyword(word: &str) -> Option<Section> {
    let upper = word.to_uppercase();
    if upper.starts_with("ELEM") {
        Some(Section::Elements)
    } else if upper.starts_with("SPEC") {
        Some(Section::Species)
    } else if upper.starts_with("THER") {
        Some(Section::Thermo)
    } else if upper.starts_with("REAC") {
        Some(Section::Reactions)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Collider {
    None,
    /// `+M`
    ThreeBody,
    /// `(+M)`, or `(+AR)` for a single collider species
    Falloff(Option<usize>),
}

/// position inside the file for error messages
#[derive(Clone, Copy)]
struct Location<'a> {
    file: &'a str,
    line: usize,
}

impl<'a> Location<'a> {
    fn syntax(&self, message: impl Into<String>) -> MechanismError {
        MechanismError::Syntax {
            file: self.file.to_string(),
            line: self.line,
            message: message.into(),
        }
    }

    fn unknown(&self, species: &str) -> MechanismError {
        MechanismError::UnknownSpecies {
            file: self.file.to_string(),
            line: self.line,
            species: species.to_string(),
        }
    }
}

/// reaction whose auxiliary lines are still being read
struct PendingReaction {
    line: usize,
    reactants: Vec<(usize, f64)>,
    products: Vec<(usize, f64)>,
    reversible: bool,
    collider: Collider,
    arrhenius: [f64; 3],
    low: Option<[f64; 3]>,
    troe: Option<Vec<f64>>,
    plog: Vec<(f64, [f64; 3])>,
    rev: Option<[f64; 3]>,
    efficiencies: Vec<(usize, f64)>,
    duplicate: bool,
}

/// number in Fortran notation, `1.0D+03` included
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim().replace(['D', 'd'], "E").parse::<f64>().ok()
}

fn strip_comment(line: &str) -> &str {
    match line.find('!') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn column(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    if start >= end {
        return "";
    }
    line.get(start..end).unwrap_or("")
}

pub fn parse_chemkin(text: &str, file: &str) -> Result<ChemkinData, MechanismError> {
    let mut data = ChemkinData::default();
    let mut names: HashMap<String, usize> = HashMap::new();
    let mut section = Section::None;
    let mut units = ReactionUnits::default();
    let mut thermo_lines: Vec<(usize, &str)> = Vec::new();
    let mut pending: Option<PendingReaction> = None;
    let mut has_reactions = false;

    for (i, raw) in text.lines().enumerate() {
        let location = Location { file, line: i + 1 };
        let line = strip_comment(raw);
        let mut words = line.split_whitespace();
        let Some(first) = words.next() else {
            continue;
        };
        let is_end = first.eq_ignore_ascii_case("END");

        match section {
            Section::None => {
                let Some(next) = section_keyword(first) else {
                    if is_end {
                        continue;
                    }
                    return Err(location.syntax(format!("unexpected '{}' outside of any section", first)));
                };
                section = next;
                let rest: Vec<&str> = words.collect();
                match section {
                    Section::Elements | Section::Species => {
                        section = read_names(&rest, section, &mut data, &mut names)?;
                    }
                    Section::Thermo => {
                        if let Some(word) = rest.iter().find(|w| !w.eq_ignore_ascii_case("ALL")) {
                            return Err(location.syntax(format!("unexpected '{}' after THERMO", word)));
                        }
                    }
                    Section::Reactions => {
                        has_reactions = true;
                        units = ReactionUnits::from_keywords(&rest).map_err(|e| location.syntax(e))?;
                    }
                    Section::None => {}
                }
            }
            Section::Elements | Section::Species => {
                let tokens: Vec<&str> = line.split_whitespace().collect();
                section = read_names(&tokens, section, &mut data, &mut names)?;
            }
            Section::Thermo => {
                if is_end {
                    read_thermo(&thermo_lines, &mut data, file)?;
                    thermo_lines.clear();
                    section = Section::None;
                } else {
                    thermo_lines.push((location.line, line));
                }
            }
            Section::Reactions => {
                if is_end {
                    if let Some(done) = pending.take() {
                        finish_reaction(done, units, file, &mut data)?;
                    }
                    section = Section::None;
                } else if is_reaction_line(line) {
                    if let Some(done) = pending.take() {
                        finish_reaction(done, units, file, &mut data)?;
                    }
                    pending = Some(read_reaction_line(line, &names, location)?);
                } else {
                    let Some(current) = pending.as_mut() else {
                        return Err(location.syntax("auxiliary data before the first reaction"));
                    };
                    read_auxiliary(current, line, &names, location)?;
                }
            }
        }
    }
    // files are allowed to end without the closing END
    if !thermo_lines.is_empty() {
        read_thermo(&thermo_lines, &mut data, file)?;
    }
    if let Some(done) = pending.take() {
        finish_reaction(done, units, file, &mut data)?;
    }
    if !has_reactions {
        return Err(MechanismError::NoReactions(file.to_string()));
    }
    warn_undeclared_duplicates(&data);
    debug!(
        "{}: {} elements, {} species, {} thermo records, {} reactions",
        file,
        data.elements.len(),
        data.species.len(),
        data.thermo.len(),
        data.reactions.len()
    );
    Ok(data)
}

/// names of the ELEMENTS or SPECIES section; returns the section that continues after them
fn read_names(
    tokens: &[&str],
    section: Section,
    data: &mut ChemkinData,
    names: &mut HashMap<String, usize>,
) -> Result<Section, MechanismError> {
    for token in tokens {
        if token.eq_ignore_ascii_case("END") {
            return Ok(Section::None);
        }
        match section {
            Section::Elements => {
                // optional atomic weight, e.g. D/2.014/
                let name = token.split('/').next().unwrap_or(token);
                if !name.is_empty() {
                    data.elements.push(name.to_string());
                }
            }
            _ => {
                if names.contains_key(*token) {
                    return Err(MechanismError::DuplicateSpecies(token.to_string()));
                }
                names.insert(token.to_string(), data.species.len());
                data.species.push(token.to_string());
            }
        }
    }
    Ok(section)
}

fn read_thermo(lines: &[(usize, &str)], data: &mut ChemkinData, file: &str) -> Result<(), MechanismError> {
    let mut global = (300.0, 1000.0, 5000.0);
    let mut records = lines;
    if let Some((_, first)) = lines.first() {
        let numbers: Vec<Option<f64>> = first.split_whitespace().map(parse_number).collect();
        if (3..=4).contains(&numbers.len()) && numbers.iter().all(|n| n.is_some()) {
            let numbers: Vec<f64> = numbers.into_iter().flatten().collect();
            global = (numbers[0], numbers[1], numbers[2]);
            records = &lines[1..];
        }
    }
    for chunk in records.chunks(4) {
        let location = Location { file, line: chunk[0].0 };
        if chunk.len() < 4 {
            return Err(location.syntax("incomplete NASA7 record"));
        }
        let (name, nasa) = read_nasa_record(chunk, global, location)?;
        if !data.species.is_empty() && !data.species.contains(&name) {
            debug!("{}: thermo record for undeclared species {} skipped", file, name);
            continue;
        }
        data.thermo.insert(name, nasa);
    }
    Ok(())
}

fn read_nasa_record(
    chunk: &[(usize, &str)],
    global: (f64, f64, f64),
    location: Location,
) -> Result<(String, Nasa7), MechanismError> {
    let header = chunk[0].1;
    let name = header
        .split_whitespace()
        .next()
        .ok_or_else(|| location.syntax("NASA7 record without species name"))?
        .to_string();
    let temperature = |start: usize, end: usize, default: f64| -> Result<f64, MechanismError> {
        let field = column(header, start, end).trim();
        if field.is_empty() {
            return Ok(default);
        }
        parse_number(field).ok_or_else(|| location.syntax(format!("bad temperature '{}' for {}", field, name)))
    };
    let t_low = temperature(45, 55, global.0)?;
    let t_high = temperature(55, 65, global.2)?;
    let t_mid = temperature(65, 73, global.1)?;

    let mut coefficients = Vec::with_capacity(14);
    for (k, (line_no, line)) in chunk[1..].iter().enumerate() {
        let fields = if k == 2 { 4 } else { 5 };
        for j in 0..fields {
            let field = column(line, 15 * j, 15 * (j + 1));
            let value = parse_number(field).ok_or_else(|| MechanismError::Syntax {
                file: location.file.to_string(),
                line: *line_no,
                message: format!("bad NASA7 coefficient '{}' for {}", field.trim(), name),
            })?;
            coefficients.push(value);
        }
    }
    let mut high = [0.0; 7];
    let mut low = [0.0; 7];
    high.copy_from_slice(&coefficients[0..7]);
    low.copy_from_slice(&coefficients[7..14]);
    Ok((name, Nasa7::new(t_low, t_mid, t_high, low, high)))
}

/// Reaction lines are an equation followed by A, n and Ea. Generated species labels may contain
/// `=` and `#` themselves, so a line with `KEY/values/` groups or a DUPLICATE keyword is auxiliary
/// data whatever else it contains.
fn is_reaction_line(line: &str) -> bool {
    if AUXILIARY.is_match(line) || line.contains('/') {
        return false;
    }
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.iter().all(|w| matches!(w.to_uppercase().as_str(), "DUPLICATE" | "DUP")) {
        return false;
    }
    let ends_with_parameters =
        words.len() >= 4 && words[words.len() - 3..].iter().all(|w| parse_number(w).is_some());
    // a malformed parameter list still goes to the reaction parser for a precise error
    ends_with_parameters || line.contains('=')
}

/// arrow candidates in order of preference: `<=>`, then `=>`, then a bare `=`
fn arrow_candidates(equation: &str) -> Vec<(usize, usize, bool)> {
    let mut candidates: Vec<(usize, usize, bool)> = equation.match_indices("<=>").map(|(i, _)| (i, 3, true)).collect();
    candidates.extend(
        equation
            .match_indices("=>")
            .filter(|(i, _)| *i == 0 || !equation[..*i].ends_with('<'))
            .map(|(i, _)| (i, 2, false)),
    );
    candidates.extend(equation.match_indices('=').filter_map(|(i, _)| {
        let part_of_arrow = equation[..i].ends_with('<') || equation[i + 1..].starts_with('>');
        (!part_of_arrow).then_some((i, 1, true))
    }));
    candidates
}

fn read_reaction_line(
    line: &str,
    names: &HashMap<String, usize>,
    location: Location,
) -> Result<PendingReaction, MechanismError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 4 {
        return Err(location.syntax("expected an equation followed by A, n and Ea"));
    }
    let split = tokens.len() - 3;
    let mut arrhenius = [0.0; 3];
    for (k, token) in tokens[split..].iter().enumerate() {
        arrhenius[k] = parse_number(token)
            .ok_or_else(|| location.syntax(format!("bad rate parameter '{}'", token)))?;
    }
    let equation = tokens[..split].concat();

    let candidates = arrow_candidates(&equation);
    if candidates.is_empty() {
        return Err(location.syntax(format!("no arrow in '{}'", equation)));
    }
    // the first split whose both sides are made of declared species; otherwise the first one, for
    // the error it produces
    let sides_parse = |pos: usize, len: usize| {
        let (lhs, _) = split_falloff(&equation[..pos]);
        let (rhs, _) = split_falloff(&equation[pos + len..]);
        read_side(lhs, names, location).is_ok() && read_side(rhs, names, location).is_ok()
    };
    let (pos, len, reversible) = candidates
        .iter()
        .find(|(pos, len, _)| sides_parse(*pos, *len))
        .copied()
        .unwrap_or(candidates[0]);
    let (lhs, rhs) = (&equation[..pos], &equation[pos + len..]);

    let (lhs, left_collider) = split_falloff(lhs);
    let (rhs, right_collider) = split_falloff(rhs);
    if left_collider != right_collider {
        return Err(location.syntax(format!("falloff collider differs between sides of '{}'", equation)));
    }
    let (reactants, left_m) = read_side(lhs, names, location)?;
    let (products, right_m) = read_side(rhs, names, location)?;
    if left_m != right_m {
        return Err(location.syntax(format!("third body on one side only of '{}'", equation)));
    }
    let collider = match left_collider {
        Some("M") => Collider::Falloff(None),
        Some(species) => Collider::Falloff(Some(
            *names.get(species).ok_or_else(|| location.unknown(species))?,
        )),
        None if left_m => Collider::ThreeBody,
        None => Collider::None,
    };
    if left_m && collider != Collider::ThreeBody {
        return Err(location.syntax(format!("both +M and (+M) in '{}'", equation)));
    }
    Ok(PendingReaction {
        line: location.line,
        reactants,
        products,
        reversible,
        collider,
        arrhenius,
        low: None,
        troe: None,
        plog: Vec::new(),
        rev: None,
        efficiencies: Vec::new(),
        duplicate: false,
    })
}

/// `H+O2(+M)` -> (`H+O2`, Some("M"))
fn split_falloff(side: &str) -> (&str, Option<&str>) {
    if side.ends_with(')') {
        if let Some(pos) = side.rfind("(+") {
            return (&side[..pos], Some(&side[pos + 2..side.len() - 1]));
        }
    }
    (side, None)
}

/// longest declared species name at the start of `text` that ends at `+` or at the end
fn match_species<'n>(text: &str, names: &'n HashMap<String, usize>) -> Option<(&'n str, usize)> {
    names
        .iter()
        .filter(|(name, _)| {
            text.starts_with(name.as_str())
                && (text.len() == name.len() || text[name.len()..].starts_with('+'))
        })
        .max_by_key(|(name, _)| name.len())
        .map(|(name, index)| (name.as_str(), *index))
}

/// species terms of one side of an equation and whether it carries `+M`
fn read_side(
    side: &str,
    names: &HashMap<String, usize>,
    location: Location,
) -> Result<(Vec<(usize, f64)>, bool), MechanismError> {
    let mut terms: Vec<(usize, f64)> = Vec::new();
    let mut third_body = false;
    let mut rest = side;
    if rest.is_empty() {
        return Err(location.syntax("empty side of a reaction equation"));
    }
    while !rest.is_empty() {
        let (coefficient, consumed, index) = match match_species(rest, names) {
            Some((name, index)) => (1.0, name.len(), Some(index)),
            None => {
                let (coefficient, skip) = match COEFFICIENT.find(rest) {
                    Some(m) => (
                        m.as_str()
                            .parse::<f64>()
                            .map_err(|_| location.syntax(format!("bad coefficient in '{}'", side)))?,
                        m.end(),
                    ),
                    None => (1.0, 0),
                };
                let tail = &rest[skip..];
                match match_species(tail, names) {
                    Some((name, index)) => (coefficient, skip + name.len(), Some(index)),
                    None if tail == "M" || tail.starts_with("M+") => {
                        if skip > 0 {
                            return Err(location.syntax("stoichiometric coefficient on M"));
                        }
                        (1.0, 1, None)
                    }
                    None => {
                        let unknown = tail.split('+').next().unwrap_or(tail);
                        return Err(location.unknown(unknown));
                    }
                }
            }
        };
        match index {
            Some(index) => match terms.iter_mut().find(|(s, _)| *s == index) {
                Some((_, nu)) => *nu += coefficient,
                None => terms.push((index, coefficient)),
            },
            None => third_body = true,
        }
        rest = &rest[consumed..];
        if let Some(stripped) = rest.strip_prefix('+') {
            if stripped.is_empty() {
                return Err(location.syntax(format!("dangling '+' in '{}'", side)));
            }
            rest = stripped;
        }
    }
    if terms.is_empty() {
        return Err(location.syntax(format!("no species in '{}'", side)));
    }
    Ok((terms, third_body))
}

fn three_numbers(values: &[f64], key: &str, location: Location) -> Result<[f64; 3], MechanismError> {
    match values {
        [a, b, c] => Ok([*a, *b, *c]),
        _ => Err(location.syntax(format!("{} expects 3 numbers, got {}", key, values.len()))),
    }
}

fn read_auxiliary(
    pending: &mut PendingReaction,
    line: &str,
    names: &HashMap<String, usize>,
    location: Location,
) -> Result<(), MechanismError> {
    for captures in AUXILIARY.captures_iter(line) {
        let key = &captures[1];
        let values = captures[2]
            .split_whitespace()
            .map(|v| parse_number(v).ok_or_else(|| location.syntax(format!("bad number '{}' in {}", v, key))))
            .collect::<Result<Vec<f64>, MechanismError>>()?;
        match key.to_uppercase().as_str() {
            "LOW" => pending.low = Some(three_numbers(&values, "LOW", location)?),
            "REV" => pending.rev = Some(three_numbers(&values, "REV", location)?),
            "TROE" => {
                if !(3..=4).contains(&values.len()) {
                    return Err(location.syntax(format!("TROE expects 3 or 4 numbers, got {}", values.len())));
                }
                pending.troe = Some(values);
            }
            "PLOG" => match values.as_slice() {
                [P, A, n, Ea] => pending.plog.push((*P, [*A, *n, *Ea])),
                _ => return Err(location.syntax(format!("PLOG expects 4 numbers, got {}", values.len()))),
            },
            "SRI" | "HIGH" | "CHEB" | "TCHEB" | "PCHEB" | "LT" | "RLT" | "FORD" | "RORD" | "TDEP" => {
                return Err(location.syntax(format!("{} is not supported", key)));
            }
            _ => {
                let index = *names.get(key).ok_or_else(|| location.unknown(key))?;
                match values.as_slice() {
                    [efficiency] => pending.efficiencies.push((index, *efficiency)),
                    _ => return Err(location.syntax(format!("efficiency of {} must be one number", key))),
                }
            }
        }
    }
    let leftover = AUXILIARY.replace_all(line, "");
    for word in leftover.split_whitespace() {
        match word.to_uppercase().as_str() {
            "DUPLICATE" | "DUP" => pending.duplicate = true,
            _ => return Err(location.syntax(format!("unrecognized auxiliary data '{}'", word))),
        }
    }
    Ok(())
}

fn finish_reaction(
    pending: PendingReaction,
    units: ReactionUnits,
    file: &str,
    data: &mut ChemkinData,
) -> Result<(), MechanismError> {
    let location = Location {
        file,
        line: pending.line,
    };
    let order: f64 = pending.reactants.iter().map(|(_, nu)| nu).sum();
    let arrhenius = |raw: [f64; 3], order: f64| {
        Arrhenius::new(units.prefactor(raw[0], order), raw[1], units.activation_energy(raw[2]))
    };

    if !pending.efficiencies.is_empty() && !matches!(pending.collider, Collider::ThreeBody | Collider::Falloff(None)) {
        return Err(location.syntax("efficiencies given for a reaction without M"));
    }
    if pending.low.is_some() && !matches!(pending.collider, Collider::Falloff(_)) {
        return Err(location.syntax("LOW given for a reaction without (+M)"));
    }
    if pending.troe.is_some() && pending.low.is_none() {
        return Err(location.syntax("TROE given without LOW"));
    }
    if !pending.plog.is_empty() && pending.collider != Collider::None {
        return Err(location.syntax("PLOG cannot be combined with a third body"));
    }
    let mut eff = Efficiencies::default();
    eff.efficiencies.extend(pending.efficiencies.iter().copied());

    let kinetics = match pending.collider {
        Collider::None if !pending.plog.is_empty() => {
            let entries = pending
                .plog
                .iter()
                .map(|(P, raw)| (P * ATM, arrhenius(*raw, order)))
                .collect();
            ReactionKinetics::Pressure(PressureStruct::new(entries).map_err(|source| {
                MechanismError::Kinetics {
                    file: file.to_string(),
                    line: pending.line,
                    source,
                }
            })?)
        }
        Collider::None => ReactionKinetics::elementary(arrhenius(pending.arrhenius, order)),
        Collider::ThreeBody => ReactionKinetics::ThreeBody(ThreeBodyStruct {
            arrhenius: arrhenius(pending.arrhenius, order + 1.0),
            eff,
        }),
        Collider::Falloff(collider) => {
            let low = pending
                .low
                .ok_or_else(|| location.syntax("falloff reaction without LOW"))?;
            ReactionKinetics::Falloff(FalloffStruct {
                high_rate: arrhenius(pending.arrhenius, order),
                low_rate: arrhenius(low, order + 1.0),
                troe: pending.troe.as_ref().map(|t| Troe {
                    alpha: t[0],
                    T3: t[1],
                    T1: t[2],
                    T2: t.get(3).copied(),
                }),
                eff: match collider {
                    Some(index) => Efficiencies::single_collider(index),
                    None => eff,
                },
            })
        }
    };

    let reverse_kinetics = match pending.rev {
        Some(_) if !pending.reversible => {
            return Err(location.syntax("REV given for an irreversible reaction"));
        }
        Some(raw) => {
            let mut reverse_order: f64 = pending.products.iter().map(|(_, nu)| nu).sum();
            if pending.collider == Collider::ThreeBody {
                reverse_order += 1.0;
            }
            Some(arrhenius(raw, reverse_order))
        }
        None => None,
    };

    let mut reaction = Reaction::new(pending.reactants, pending.products, pending.reversible, kinetics);
    reaction.duplicate = pending.duplicate;
    reaction.reverse_kinetics = reverse_kinetics;
    data.reactions.push(reaction);
    data.reaction_lines.push(pending.line);
    Ok(())
}

fn sorted(terms: &[(usize, f64)]) -> Vec<(usize, u64)> {
    let mut key: Vec<(usize, u64)> = terms.iter().map(|(s, nu)| (*s, nu.to_bits())).collect();
    key.sort();
    key
}

/// same equation twice without DUPLICATE is accepted, but reported
fn warn_undeclared_duplicates(data: &ChemkinData) {
    let mut seen: HashMap<(Vec<(usize, u64)>, Vec<(usize, u64)>), usize> = HashMap::new();
    for (i, reaction) in data.reactions.iter().enumerate() {
        let key = (sorted(&reaction.reactants), sorted(&reaction.products));
        if let Some(first) = seen.get(&key) {
            if !(reaction.duplicate && data.reactions[*first].duplicate) {
                warn!(
                    "reactions {} and {} ({}) are identical but not marked DUPLICATE",
                    first,
                    i,
                    reaction.equation(&data.species)
                );
            }
        } else {
            seen.insert(key, i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Kinetics::rate_expressions::{RateCoefficient, ReactionType};
    use approx::assert_relative_eq;

    const H2O2: &str = include_str!("../../data/h2o2/chem.inp");
    const CYCLOPROPANE: &str = include_str!("../../data/cyclopropane/chem.inp");

    fn wrap(reactions: &str) -> String {
        format!(
            "ELEMENTS H O AR END\nSPECIES H O O2 OH H2O AR END\nREACTIONS\n{}\nEND\n",
            reactions
        )
    }

    #[test]
    fn test_sections_of_h2o2() {
        let data = parse_chemkin(H2O2, "chem.inp").unwrap();
        assert_eq!(data.elements, vec!["H", "O", "N", "AR"]);
        assert_eq!(data.species.len(), 10);
        assert_eq!(data.species[9], "AR");
        assert_eq!(data.thermo.len(), 10);
        assert_eq!(data.reactions.len(), 9);
        assert_eq!(data.reaction_lines.len(), 9);
        let h2 = &data.thermo["H2"];
        assert_eq!((h2.t_low, h2.t_mid, h2.t_high), (200.0, 1000.0, 6000.0));
        assert_relative_eq!(h2.high[0], 3.49992553);
        assert_relative_eq!(h2.low[5], -1.04350280e3);
    }

    #[test]
    fn test_units_of_h2o2_reactions() {
        let data = parse_chemkin(H2O2, "chem.inp").unwrap();
        let r = &data.reactions;

        let ReactionKinetics::Elementary(first) = &r[0].kinetics else {
            panic!("expected elementary kinetics");
        };
        assert_relative_eq!(first.arrhenius.A, 3.547e9, max_relative = 1e-12);
        assert_relative_eq!(first.arrhenius.Ea, 1.6599e4 * 4.184, max_relative = 1e-12);
        assert_eq!(r[0].reactants, vec![(2, 1.0), (1, 1.0)]);

        let ReactionKinetics::ThreeBody(recombination) = &r[2].kinetics else {
            panic!("expected three-body kinetics");
        };
        assert_eq!(r[2].reactants, vec![(3, 2.0)]);
        assert_relative_eq!(recombination.arrhenius.A, 1.2e5, max_relative = 1e-12);
        assert_eq!(recombination.eff.efficiencies[&0], 2.4);
        assert_eq!(recombination.eff.efficiencies[&5], 15.4);
        assert_eq!(recombination.eff.efficiencies[&9], 0.83);
        assert_eq!(recombination.eff.default_efficiency, 1.0);

        let ReactionKinetics::Falloff(falloff) = &r[3].kinetics else {
            panic!("expected falloff kinetics");
        };
        assert_relative_eq!(falloff.high_rate.A, 4.65e6, max_relative = 1e-12);
        assert_relative_eq!(falloff.low_rate.A, 6.366e8, max_relative = 1e-12);
        let troe = falloff.troe.as_ref().unwrap();
        assert_eq!((troe.alpha, troe.T2), (0.5, None));
        assert_eq!(falloff.eff.efficiencies.len(), 4);

        let ReactionKinetics::Falloff(decomposition) = &r[4].kinetics else {
            panic!("expected falloff kinetics");
        };
        assert_eq!(decomposition.eff.is_single_collider(), Some(9));
        assert_eq!(r[4].products, vec![(4, 2.0)]);
        assert_eq!(r[4].equation(&data.species), "H2O2(+AR)<=>2OH(+AR)");

        let ReactionKinetics::Pressure(plog) = &r[5].kinetics else {
            panic!("expected PLOG kinetics");
        };
        let pressures: Vec<f64> = plog.rates.iter().map(|(P, _)| *P).collect();
        assert_eq!(pressures, vec![0.1 * ATM, ATM, 10.0 * ATM]);
        assert_relative_eq!(plog.rates[0].1[0].A, 3.57e-2, max_relative = 1e-12);
        assert_eq!(r[5].reactants, vec![(4, 2.0)]);

        assert!(r[6].duplicate && r[7].duplicate);
        assert!(!r[0].duplicate);

        let reverse = r[8].reverse_kinetics.as_ref().unwrap();
        assert_relative_eq!(reverse.A, 1.0, max_relative = 1e-12);
        assert_relative_eq!(reverse.Ea, 1000.0 * 4.184, max_relative = 1e-12);
        assert!(r[8].reversible);
    }

    #[test]
    fn test_cyclopropane_with_global_temperatures() {
        let data = parse_chemkin(CYCLOPROPANE, "chem.inp").unwrap();
        assert_eq!(data.species, vec!["Ar", "cC3H6(1)", "C3H6(2)"]);
        assert_eq!(data.thermo.len(), 3);
        let reaction = &data.reactions[0];
        assert!(!reaction.reversible);
        assert_eq!(reaction.reactants, vec![(1, 1.0)]);
        assert_eq!(reaction.products, vec![(2, 1.0)]);
        assert_eq!(reaction.reaction_type(), ReactionType::Elem);
        let k = reaction.kinetics.K_const(1000.0, 1e5, 0.0);
        assert_relative_eq!(k, 1e13 * f64::exp(-65000.0 * 4.184 / (R * 1000.0)), max_relative = 1e-10);
    }

    #[test]
    fn test_unit_keywords() {
        let text = "SPECIES H O2 OH O END\nREACTIONS KJOULES/MOLE MOLECULES\nH+O2=OH+O 1.0E-10 0.0 10.0\nEND";
        let data = parse_chemkin(text, "units.inp").unwrap();
        let ReactionKinetics::Elementary(kinetics) = &data.reactions[0].kinetics else {
            panic!("expected elementary kinetics");
        };
        assert_relative_eq!(kinetics.arrhenius.A, 1.0e-10 * AVOGADRO * 1e-6, max_relative = 1e-12);
        assert_relative_eq!(kinetics.arrhenius.Ea, 1.0e4);
        assert!(data.reactions[0].reversible);

        let kelvins = "SPECIES H O2 OH O END\nREACTIONS KELVINS\nH+O2=OH+O 1.0 0.0 1000.0\n";
        let data = parse_chemkin(kelvins, "units.inp").unwrap();
        let ReactionKinetics::Elementary(kinetics) = &data.reactions[0].kinetics else {
            panic!("expected elementary kinetics");
        };
        assert_relative_eq!(kinetics.arrhenius.Ea, 1000.0 * R);
        assert_relative_eq!(parse_number("1.5D+03").unwrap(), 1500.0);
    }

    #[test]
    fn test_greedy_species_names() {
        let text = "SPECIES O O2 OH H2O OH2O END\nREACTIONS\nOH+OH2O=O2+H2O+OH 1.0 0 0\n2O2=O2+2O 1.0 0 0\n";
        let data = parse_chemkin(text, "names.inp").unwrap();
        assert_eq!(data.reactions[0].reactants, vec![(2, 1.0), (4, 1.0)]);
        assert_eq!(data.reactions[0].products, vec![(1, 1.0), (3, 1.0), (2, 1.0)]);
        assert_eq!(data.reactions[1].reactants, vec![(1, 2.0)]);
        assert_eq!(data.reactions[1].products, vec![(1, 1.0), (0, 2.0)]);
    }

    #[test]
    fn test_labels_with_bond_symbols() {
        let text = "\
SPECIES Ar C=C(1) [H](2) CC[CH2](3) C#C(4) END
REACTIONS
C=C(1)+[H](2)+M<=>CC[CH2](3)+M 1e13 0 1
C=C(1)/2.0/ Ar/0.7/
C=C(1)=C#C(4)+2[H](2) 1e10 0 80
C#C(4)+[H](2)+[H](2)=>C=C(1) 1e8 0 0
DUPLICATE
CC[CH2](3)=>C=C(1)+[H](2) 2e13 0 35
END
";
        let data = parse_chemkin(text, "labels.inp").unwrap();
        assert_eq!(data.reactions.len(), 4);
        let r = &data.reactions;
        assert_eq!(r[0].reactants, vec![(1, 1.0), (2, 1.0)]);
        assert_eq!(r[0].products, vec![(3, 1.0)]);
        let ReactionKinetics::ThreeBody(three_body) = &r[0].kinetics else {
            panic!("expected three-body kinetics");
        };
        assert_eq!(three_body.eff.efficiencies[&1], 2.0);
        assert_eq!(three_body.eff.efficiencies[&0], 0.7);

        assert!(r[1].reversible);
        assert_eq!(r[1].reactants, vec![(1, 1.0)]);
        assert_eq!(r[1].products, vec![(4, 1.0), (2, 2.0)]);
        assert!(!r[2].reversible && r[2].duplicate);
        assert_eq!(r[2].reactants, vec![(4, 1.0), (2, 2.0)]);
        assert_eq!(r[3].products, vec![(1, 1.0), (2, 1.0)]);
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let unknown = parse_chemkin(&wrap("H+N2<=>OH 1.0 0.0 0.0"), "bad.inp").unwrap_err();
        assert!(matches!(
            unknown,
            MechanismError::UnknownSpecies { line: 4, ref species, .. } if species == "N2"
        ));

        let no_low = parse_chemkin(&wrap("H+O2(+M)<=>OH+O(+M) 1.0 0.0 0.0"), "bad.inp").unwrap_err();
        assert!(matches!(no_low, MechanismError::Syntax { line: 4, .. }));

        let bad_number = parse_chemkin(&wrap("H+O2<=>OH+O 1.0 x 0.0"), "bad.inp").unwrap_err();
        assert!(bad_number.to_string().contains("bad.inp, line 4"));

        let orphan = parse_chemkin(&wrap("LOW / 1 2 3 /"), "bad.inp").unwrap_err();
        assert!(matches!(orphan, MechanismError::Syntax { line: 4, .. }));

        let efficiency = parse_chemkin(&wrap("H+O2<=>OH+O 1.0 0.0 0.0\nH2O/2.0/"), "bad.inp").unwrap_err();
        assert!(matches!(efficiency, MechanismError::Syntax { line: 4, .. }));

        let units = parse_chemkin("SPECIES H END\nREACTIONS FURLONGS\n", "bad.inp").unwrap_err();
        assert!(units.to_string().contains("FURLONGS"));

        let twice = parse_chemkin("SPECIES H H END\nREACTIONS\n", "bad.inp").unwrap_err();
        assert!(matches!(twice, MechanismError::DuplicateSpecies(ref s) if s == "H"));

        let no_reactions = parse_chemkin("SPECIES H END\n", "bad.inp").unwrap_err();
        assert!(matches!(no_reactions, MechanismError::NoReactions(_)));

        let rev = parse_chemkin(&wrap("H+O2=>OH+O 1.0 0.0 0.0\nREV/ 1.0 0.0 0.0 /"), "bad.inp").unwrap_err();
        assert!(rev.to_string().contains("irreversible"));
    }
}
