#[cfg(test)]
pub mod common;


#[cfg(test)]
mod test_move_effects;

#[cfg(test)]
mod test_abilities;



#[cfg(test)]
mod test_status;


#[cfg(test)]
mod test_suspension;

#[cfg(test)]
mod test_battler_tags;
