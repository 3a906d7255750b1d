//! Small constraint models stated on a [`ConstraintSpace`].
//!
//! Every model returns the space together with the variables worth printing, in the order in
//! which they were created.
use rivulet_core::constraints;
use rivulet_core::constraints::Constraint;
use rivulet_core::engine::variables::DomainId;
use rivulet_core::engine::variables::TransformableVariable;
use rivulet_core::engine::ConstraintSpace;
use rivulet_core::ConstraintOperationError;

/// A constraint space and its named variables.
#[derive(Debug)]
pub struct Model {
    pub space: ConstraintSpace,
    pub variables: Vec<(String, DomainId)>,
}

impl Model {
    fn new() -> Model {
        Model {
            space: ConstraintSpace::default(),
            variables: vec![],
        }
    }

    fn new_variable(&mut self, name: impl Into<String>, lower_bound: i32, upper_bound: i32) -> DomainId {
        let variable = self.space.new_bounded_integer(lower_bound, upper_bound);
        self.variables.push((name.into(), variable));
        variable
    }

    pub fn domains(&self) -> Vec<DomainId> {
        self.variables.iter().map(|&(_, variable)| variable).collect()
    }
}

/// Place `n` queens on an `n x n` board so that no two attack each other. Queen `i` stands in
/// column `i`, its variable is its row.
pub fn queens(n: u32) -> Result<Model, ConstraintOperationError> {
    let mut model = Model::new();
    let upper_bound = n.saturating_sub(1) as i32;
    let rows = (0..n)
        .map(|i| model.new_variable(format!("q{i}"), 0, upper_bound))
        .collect::<Vec<_>>();

    let ascending = rows
        .iter()
        .enumerate()
        .map(|(i, row)| row.offset(i as i32))
        .collect::<Vec<_>>();
    let descending = rows
        .iter()
        .enumerate()
        .map(|(i, row)| row.offset(-(i as i32)))
        .collect::<Vec<_>>();

    constraints::all_different(rows).post(&mut model.space)?;
    constraints::all_different(ascending).post(&mut model.space)?;
    constraints::all_different(descending).post(&mut model.space)?;

    Ok(model)
}

/// The cryptarithm SEND + MORE = MONEY with distinct digits and no leading zeros.
pub fn send_more_money() -> Result<Model, ConstraintOperationError> {
    let mut model = Model::new();
    let [s, e, n, d, m, o, r, y] =
        ["S", "E", "N", "D", "M", "O", "R", "Y"].map(|letter| model.new_variable(letter, 0, 9));

    constraints::all_different(vec![s, e, n, d, m, o, r, y]).post(&mut model.space)?;
    constraints::not_equals_constant(s, 0).post(&mut model.space)?;
    constraints::not_equals_constant(m, 0).post(&mut model.space)?;

    // SEND + MORE - MONEY = 0
    let terms = [
        (s, 1000),
        (e, 91),
        (n, -90),
        (d, 1),
        (m, -9000),
        (o, -900),
        (r, 10),
        (y, -1),
    ]
    .map(|(letter, weight)| letter.scaled(weight));
    constraints::linear_equals(terms.to_vec(), 0).post(&mut model.space)?;

    Ok(model)
}

/// Two Boolean variables which are not both true.
pub fn not_both_true() -> Result<Model, ConstraintOperationError> {
    let mut model = Model::new();
    let x = model.new_variable("x", 0, 1);
    let y = model.new_variable("y", 0, 1);

    constraints::not_all(vec![x, y]).post(&mut model.space)?;

    Ok(model)
}
