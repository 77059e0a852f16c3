mod composition;
mod rules;
mod selection_map;
